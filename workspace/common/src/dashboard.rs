use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A condensed invoice view for dashboard listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceSummary {
    /// Invoice ID
    pub id: i32,
    /// Invoice number
    pub number: String,
    /// Invoice date
    pub date: NaiveDate,
    /// Grand total
    pub total_amount: Decimal,
    /// Document status (draft/posted/cancelled)
    pub status: String,
}

/// Aggregate numbers for the landing dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    /// The day the summary was computed for
    pub date: NaiveDate,
    /// Total of sales invoices posted on that day
    pub daily_sales_total: Decimal,
    /// Number of active products
    pub active_products: u64,
    /// Number of active products at or below their minimum stock
    pub low_stock_products: u64,
    /// Five most recent sales invoices
    pub recent_sales: Vec<InvoiceSummary>,
    /// Five most recent purchase invoices
    pub recent_purchases: Vec<InvoiceSummary>,
}
