//! Invoice totals: each line total is `quantity * unit_price *
//! (1 + tax_rate/100) - discount_amount`, the subtotal is the sum of line
//! totals, and the grand total adds the invoice-level tax and subtracts the
//! invoice-level discount.

use model::entities::{purchase_invoice, purchase_invoice_line, sales_invoice, sales_invoice_line};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, instrument, trace};

use crate::error::{ComputeError, Result};

/// Line total with the discount applied AFTER tax, rounded to two decimal
/// places half-to-even. The ordering matters: discounting before tax would
/// round differently.
pub fn line_total(
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
    discount_amount: Decimal,
) -> Decimal {
    let taxed = quantity * unit_price * (Decimal::ONE + tax_rate / Decimal::ONE_HUNDRED);
    (taxed - discount_amount).round_dp(2)
}

/// Grand total from the subtotal and the invoice-level tax and discount,
/// which are distinct from the per-line tax and discount.
pub fn grand_total(subtotal: Decimal, tax_amount: Decimal, discount_amount: Decimal) -> Decimal {
    subtotal + tax_amount - discount_amount
}

/// Recomputes every line total on a sales invoice, then the invoice's
/// subtotal and grand total. The invoice row is locked for the duration.
#[instrument(skip(conn))]
pub async fn recompute_sales_invoice_totals<C>(
    conn: &C,
    invoice_id: i32,
) -> Result<sales_invoice::Model>
where
    C: ConnectionTrait,
{
    trace!("Recomputing totals for sales invoice {}", invoice_id);

    let invoice = sales_invoice::Entity::find_by_id(invoice_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ComputeError::not_found("sales invoice", invoice_id))?;

    let lines = sales_invoice_line::Entity::find()
        .filter(sales_invoice_line::Column::InvoiceId.eq(invoice_id))
        .all(conn)
        .await?;

    let mut subtotal = Decimal::ZERO;
    for line in lines {
        let total = line_total(
            line.quantity,
            line.unit_price,
            line.tax_rate,
            line.discount_amount,
        );
        subtotal += total;
        if total != line.total {
            let mut active: sales_invoice_line::ActiveModel = line.into();
            active.total = Set(total);
            active.update(conn).await?;
        }
    }

    let total_amount = grand_total(subtotal, invoice.tax_amount, invoice.discount_amount);
    debug!(
        "Sales invoice {} ({}): subtotal={}, total={}",
        invoice.number, invoice_id, subtotal, total_amount
    );

    let mut active: sales_invoice::ActiveModel = invoice.into();
    active.subtotal = Set(subtotal);
    active.total_amount = Set(total_amount);
    Ok(active.update(conn).await?)
}

/// Purchase-side counterpart of [`recompute_sales_invoice_totals`].
#[instrument(skip(conn))]
pub async fn recompute_purchase_invoice_totals<C>(
    conn: &C,
    invoice_id: i32,
) -> Result<purchase_invoice::Model>
where
    C: ConnectionTrait,
{
    trace!("Recomputing totals for purchase invoice {}", invoice_id);

    let invoice = purchase_invoice::Entity::find_by_id(invoice_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ComputeError::not_found("purchase invoice", invoice_id))?;

    let lines = purchase_invoice_line::Entity::find()
        .filter(purchase_invoice_line::Column::InvoiceId.eq(invoice_id))
        .all(conn)
        .await?;

    let mut subtotal = Decimal::ZERO;
    for line in lines {
        let total = line_total(
            line.quantity,
            line.unit_price,
            line.tax_rate,
            line.discount_amount,
        );
        subtotal += total;
        if total != line.total {
            let mut active: purchase_invoice_line::ActiveModel = line.into();
            active.total = Set(total);
            active.update(conn).await?;
        }
    }

    let total_amount = grand_total(subtotal, invoice.tax_amount, invoice.discount_amount);
    debug!(
        "Purchase invoice {} ({}): subtotal={}, total={}",
        invoice.number, invoice_id, subtotal, total_amount
    );

    let mut active: purchase_invoice::ActiveModel = invoice.into();
    active.subtotal = Set(subtotal);
    active.total_amount = Set(total_amount);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn line_total_applies_discount_after_tax() {
        // 2 * 100 * 1.14 - 10 = 218.00
        let total = line_total(
            Decimal::new(200, 2),
            Decimal::new(10_000, 2),
            Decimal::new(1_400, 2),
            Decimal::new(1_000, 2),
        );
        assert_eq!(total, Decimal::new(21_800, 2));
    }

    #[test]
    fn line_total_rounds_to_two_places() {
        // 3 * 9.99 * 1.15 = 34.4655 -> 34.47
        let total = line_total(
            Decimal::new(300, 2),
            Decimal::new(999, 2),
            Decimal::new(1_500, 2),
            Decimal::ZERO,
        );
        assert_eq!(total, Decimal::new(3_447, 2));
    }

    #[test]
    fn grand_total_adds_tax_and_subtracts_discount() {
        let total = grand_total(
            Decimal::new(21_800, 2),
            Decimal::new(500, 2),
            Decimal::new(300, 2),
        );
        assert_eq!(total, Decimal::new(22_000, 2));
    }

    #[tokio::test]
    async fn invoice_totals_follow_lines() {
        let db = testing::setup_db().await;
        let scenario = testing::SalesScenario::seed(&db).await;

        // qty 2 @ 100, 14% tax, 10 discount -> 218.00
        testing::insert_sales_line(
            &db,
            scenario.invoice.id,
            scenario.product.id,
            Decimal::new(200, 2),
            Decimal::new(10_000, 2),
            Decimal::new(1_400, 2),
            Decimal::new(1_000, 2),
        )
        .await;
        // qty 1 @ 50, no tax, no discount -> 50.00
        testing::insert_sales_line(
            &db,
            scenario.invoice.id,
            scenario.product.id,
            Decimal::new(100, 2),
            Decimal::new(5_000, 2),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .await;

        let updated = recompute_sales_invoice_totals(&db, scenario.invoice.id)
            .await
            .unwrap();
        assert_eq!(updated.subtotal, Decimal::new(26_800, 2));
        // Header tax/discount both zero in the seed
        assert_eq!(updated.total_amount, Decimal::new(26_800, 2));
    }

    #[tokio::test]
    async fn stale_line_totals_are_repaired() {
        let db = testing::setup_db().await;
        let scenario = testing::SalesScenario::seed(&db).await;
        let line = testing::insert_sales_line(
            &db,
            scenario.invoice.id,
            scenario.product.id,
            Decimal::new(100, 2),
            Decimal::new(5_000, 2),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .await;
        // The helper stores a zero total; recomputation must overwrite it.
        assert_eq!(line.total, Decimal::ZERO);

        let updated = recompute_sales_invoice_totals(&db, scenario.invoice.id)
            .await
            .unwrap();
        assert_eq!(updated.subtotal, Decimal::new(5_000, 2));

        let stored = sales_invoice_line::Entity::find_by_id(line.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total, Decimal::new(5_000, 2));
    }

    #[tokio::test]
    async fn empty_invoice_totals_are_zero() {
        let db = testing::setup_db().await;
        let scenario = testing::SalesScenario::seed(&db).await;

        let updated = recompute_sales_invoice_totals(&db, scenario.invoice.id)
            .await
            .unwrap();
        assert_eq!(updated.subtotal, Decimal::ZERO);
        assert_eq!(updated.total_amount, Decimal::ZERO);
    }
}
