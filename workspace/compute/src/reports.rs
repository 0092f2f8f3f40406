//! Read-only report queries over the stored aggregates. These never write;
//! they trust the cached columns maintained by the recomputation rules.

use chrono::NaiveDate;
use common::{DashboardSummary, InvoiceSummary, LowStockRow, TrialBalance, TrialBalanceRow};
use model::entities::account::{self, NormalBalance};
use model::entities::document_status::DocumentStatus;
use model::entities::{product, purchase_invoice, sales_invoice};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::instrument;

use crate::error::Result;

/// Trial balance over all active accounts: each stored balance lands in the
/// column matching the account's normal side.
#[instrument(skip(conn))]
pub async fn trial_balance<C>(conn: &C) -> Result<TrialBalance>
where
    C: ConnectionTrait,
{
    let accounts = account::Entity::find()
        .filter(account::Column::IsActive.eq(true))
        .order_by_asc(account::Column::Code)
        .all(conn)
        .await?;

    let rows = accounts
        .into_iter()
        .map(|a| {
            let (debit, credit) = match a.normal_balance {
                NormalBalance::Debit => (a.balance, Decimal::ZERO),
                NormalBalance::Credit => (Decimal::ZERO, a.balance),
            };
            TrialBalanceRow {
                account_id: a.id,
                code: a.code,
                name: a.name,
                debit,
                credit,
            }
        })
        .collect();

    Ok(TrialBalance::new(rows))
}

/// Active products whose stock is at or below their minimum threshold.
#[instrument(skip(conn))]
pub async fn low_stock<C>(conn: &C) -> Result<Vec<LowStockRow>>
where
    C: ConnectionTrait,
{
    let products = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .filter(
            Expr::col(product::Column::CurrentStock).lte(Expr::col(product::Column::MinStock)),
        )
        .order_by_asc(product::Column::Code)
        .all(conn)
        .await?;

    Ok(products
        .into_iter()
        .map(|p| LowStockRow {
            product_id: p.id,
            code: p.code,
            name: p.name,
            current_stock: p.current_stock,
            min_stock: p.min_stock,
        })
        .collect())
}

fn summarize_sales(invoice: sales_invoice::Model) -> InvoiceSummary {
    InvoiceSummary {
        id: invoice.id,
        number: invoice.number,
        date: invoice.date,
        total_amount: invoice.total_amount,
        status: invoice.status.as_str().to_string(),
    }
}

fn summarize_purchase(invoice: purchase_invoice::Model) -> InvoiceSummary {
    InvoiceSummary {
        id: invoice.id,
        number: invoice.number,
        date: invoice.date,
        total_amount: invoice.total_amount,
        status: invoice.status.as_str().to_string(),
    }
}

/// Landing-page numbers: the day's posted sales, product counts, and the
/// five most recent invoices on each side.
#[instrument(skip(conn))]
pub async fn dashboard<C>(conn: &C, today: NaiveDate) -> Result<DashboardSummary>
where
    C: ConnectionTrait,
{
    let daily: Option<Option<Decimal>> = sales_invoice::Entity::find()
        .select_only()
        .column_as(sales_invoice::Column::TotalAmount.sum(), "total")
        .filter(sales_invoice::Column::Date.eq(today))
        .filter(sales_invoice::Column::Status.eq(DocumentStatus::Posted))
        .into_tuple()
        .one(conn)
        .await?;
    let daily_sales_total = daily.flatten().unwrap_or(Decimal::ZERO);

    let active_products = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .count(conn)
        .await?;

    let low_stock_products = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .filter(
            Expr::col(product::Column::CurrentStock).lte(Expr::col(product::Column::MinStock)),
        )
        .count(conn)
        .await?;

    let recent_sales = sales_invoice::Entity::find()
        .order_by_desc(sales_invoice::Column::Date)
        .order_by_desc(sales_invoice::Column::Id)
        .limit(5)
        .all(conn)
        .await?
        .into_iter()
        .map(summarize_sales)
        .collect();

    let recent_purchases = purchase_invoice::Entity::find()
        .order_by_desc(purchase_invoice::Column::Date)
        .order_by_desc(purchase_invoice::Column::Id)
        .limit(5)
        .all(conn)
        .await?
        .into_iter()
        .map(summarize_purchase)
        .collect();

    Ok(DashboardSummary {
        date: today,
        daily_sales_total,
        active_products,
        low_stock_products,
        recent_sales,
        recent_purchases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use model::entities::account::NormalBalance;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn trial_balance_splits_columns_by_normal_side() {
        let db = testing::setup_db().await;
        let cash = testing::insert_account(&db, "1000", NormalBalance::Debit).await;
        let revenue = testing::insert_account(&db, "4000", NormalBalance::Credit).await;

        let mut active: account::ActiveModel = cash.into();
        active.balance = Set(Decimal::new(12_000, 2));
        active.update(&db).await.unwrap();
        let mut active: account::ActiveModel = revenue.into();
        active.balance = Set(Decimal::new(12_000, 2));
        active.update(&db).await.unwrap();

        let tb = trial_balance(&db).await.unwrap();
        assert_eq!(tb.rows.len(), 2);
        assert_eq!(tb.rows[0].debit, Decimal::new(12_000, 2));
        assert_eq!(tb.rows[0].credit, Decimal::ZERO);
        assert_eq!(tb.rows[1].credit, Decimal::new(12_000, 2));
        assert!(tb.is_balanced());
    }

    #[tokio::test]
    async fn low_stock_lists_products_at_or_below_minimum() {
        let db = testing::setup_db().await;
        let (product, _) = testing::insert_product(&db, "P-1").await;
        // Seeded with current_stock = 0 and min_stock = 0, so 0 <= 0 applies
        let rows = low_stock(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, product.id);
    }
}
