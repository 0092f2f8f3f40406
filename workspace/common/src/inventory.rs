use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A product whose stock has fallen to or below its minimum threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LowStockRow {
    /// Product ID
    pub product_id: i32,
    /// Product code
    pub code: String,
    /// Product name
    pub name: String,
    /// Current stock level
    pub current_stock: Decimal,
    /// Minimum stock threshold
    pub min_stock: Decimal,
}
