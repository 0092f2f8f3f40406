//! Party balance rules: a customer or supplier owes the total of their
//! posted invoices minus the total of their posted payments. Draft and
//! cancelled documents never contribute.

use model::entities::document_status::DocumentStatus;
use model::entities::{
    customer, customer_payment, purchase_invoice, sales_invoice, supplier, supplier_payment,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, instrument, trace};

use crate::error::{ComputeError, Result};

/// Outstanding balance from the posted-invoice and posted-payment totals.
pub fn outstanding_balance(invoice_total: Decimal, payment_total: Decimal) -> Decimal {
    invoice_total - payment_total
}

async fn posted_sales_total<C>(conn: &C, customer_id: i32) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = sales_invoice::Entity::find()
        .select_only()
        .column_as(sales_invoice::Column::TotalAmount.sum(), "total")
        .filter(sales_invoice::Column::CustomerId.eq(customer_id))
        .filter(sales_invoice::Column::Status.eq(DocumentStatus::Posted))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

async fn posted_customer_payments_total<C>(conn: &C, customer_id: i32) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = customer_payment::Entity::find()
        .select_only()
        .column_as(customer_payment::Column::Amount.sum(), "total")
        .filter(customer_payment::Column::CustomerId.eq(customer_id))
        .filter(customer_payment::Column::Status.eq(DocumentStatus::Posted))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

async fn posted_purchases_total<C>(conn: &C, supplier_id: i32) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = purchase_invoice::Entity::find()
        .select_only()
        .column_as(purchase_invoice::Column::TotalAmount.sum(), "total")
        .filter(purchase_invoice::Column::SupplierId.eq(supplier_id))
        .filter(purchase_invoice::Column::Status.eq(DocumentStatus::Posted))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

async fn posted_supplier_payments_total<C>(conn: &C, supplier_id: i32) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = supplier_payment::Entity::find()
        .select_only()
        .column_as(supplier_payment::Column::Amount.sum(), "total")
        .filter(supplier_payment::Column::SupplierId.eq(supplier_id))
        .filter(supplier_payment::Column::Status.eq(DocumentStatus::Posted))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

/// Recomputes and stores the customer's outstanding balance. Triggered
/// whenever a sales invoice or customer payment enters or leaves the
/// `posted` state, in the same transaction as that status change.
#[instrument(skip(conn))]
pub async fn recompute_customer_balance<C>(conn: &C, customer_id: i32) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    trace!("Recomputing balance for customer_id={}", customer_id);

    let customer = customer::Entity::find_by_id(customer_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ComputeError::not_found("customer", customer_id))?;

    let invoiced = posted_sales_total(conn, customer_id).await?;
    let paid = posted_customer_payments_total(conn, customer_id).await?;
    let balance = outstanding_balance(invoiced, paid);

    debug!(
        "Customer {} ({}): invoiced={}, paid={}, balance={}",
        customer.code, customer_id, invoiced, paid, balance
    );

    let mut active: customer::ActiveModel = customer.into();
    active.current_balance = Set(balance);
    Ok(active.update(conn).await?)
}

/// Supplier-side counterpart of [`recompute_customer_balance`].
#[instrument(skip(conn))]
pub async fn recompute_supplier_balance<C>(conn: &C, supplier_id: i32) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    trace!("Recomputing balance for supplier_id={}", supplier_id);

    let supplier = supplier::Entity::find_by_id(supplier_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ComputeError::not_found("supplier", supplier_id))?;

    let invoiced = posted_purchases_total(conn, supplier_id).await?;
    let paid = posted_supplier_payments_total(conn, supplier_id).await?;
    let balance = outstanding_balance(invoiced, paid);

    debug!(
        "Supplier {} ({}): invoiced={}, paid={}, balance={}",
        supplier.code, supplier_id, invoiced, paid, balance
    );

    let mut active: supplier::ActiveModel = supplier.into();
    active.current_balance = Set(balance);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn posted_invoice_minus_posted_payment() {
        let db = testing::setup_db().await;
        let scenario = testing::SalesScenario::seed(&db).await;
        testing::set_invoice_status_and_total(
            &db,
            scenario.invoice.id,
            DocumentStatus::Posted,
            Decimal::new(50_000, 2),
        )
        .await;
        testing::insert_customer_payment(
            &db,
            scenario.customer.id,
            Decimal::new(20_000, 2),
            DocumentStatus::Posted,
        )
        .await;

        let updated = recompute_customer_balance(&db, scenario.customer.id)
            .await
            .unwrap();
        assert_eq!(updated.current_balance, Decimal::new(30_000, 2));
    }

    #[tokio::test]
    async fn draft_documents_do_not_contribute() {
        let db = testing::setup_db().await;
        let scenario = testing::SalesScenario::seed(&db).await;
        // The seeded invoice stays in draft
        testing::set_invoice_status_and_total(
            &db,
            scenario.invoice.id,
            DocumentStatus::Draft,
            Decimal::new(50_000, 2),
        )
        .await;
        testing::insert_customer_payment(
            &db,
            scenario.customer.id,
            Decimal::new(20_000, 2),
            DocumentStatus::Draft,
        )
        .await;

        let updated = recompute_customer_balance(&db, scenario.customer.id)
            .await
            .unwrap();
        assert_eq!(updated.current_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn cancelling_a_posted_payment_restores_the_balance() {
        let db = testing::setup_db().await;
        let scenario = testing::SalesScenario::seed(&db).await;
        testing::set_invoice_status_and_total(
            &db,
            scenario.invoice.id,
            DocumentStatus::Posted,
            Decimal::new(50_000, 2),
        )
        .await;
        let payment = testing::insert_customer_payment(
            &db,
            scenario.customer.id,
            Decimal::new(20_000, 2),
            DocumentStatus::Posted,
        )
        .await;

        let before = recompute_customer_balance(&db, scenario.customer.id)
            .await
            .unwrap();
        assert_eq!(before.current_balance, Decimal::new(30_000, 2));

        testing::set_customer_payment_status(&db, payment.id, DocumentStatus::Cancelled).await;
        let after = recompute_customer_balance(&db, scenario.customer.id)
            .await
            .unwrap();
        assert_eq!(after.current_balance, Decimal::new(50_000, 2));
    }

    #[tokio::test]
    async fn supplier_balance_mirrors_purchases() {
        let db = testing::setup_db().await;
        let scenario = testing::PurchaseScenario::seed(&db).await;
        testing::set_purchase_invoice_status_and_total(
            &db,
            scenario.invoice.id,
            DocumentStatus::Posted,
            Decimal::new(40_000, 2),
        )
        .await;
        testing::insert_supplier_payment(
            &db,
            scenario.supplier.id,
            Decimal::new(15_000, 2),
            DocumentStatus::Posted,
        )
        .await;

        let updated = recompute_supplier_balance(&db, scenario.supplier.id)
            .await
            .unwrap();
        assert_eq!(updated.current_balance, Decimal::new(25_000, 2));
    }
}
