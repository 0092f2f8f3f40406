use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unit of measure for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[sea_orm(string_value = "piece")]
    Piece,
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "meter")]
    Meter,
    #[sea_orm(string_value = "liter")]
    Liter,
}

/// A stocked product.
///
/// `current_stock` is a cache derived from stock movements and only written
/// by the stock recomputation rule. `min_stock` feeds the low-stock report.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i32,
    pub unit: Unit,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub purchase_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub sale_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub min_stock: Decimal,
    /// Derived: inward movements minus outward movements.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub current_stock: Decimal,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovement,
    #[sea_orm(has_many = "super::sales_invoice_line::Entity")]
    SalesInvoiceLine,
    #[sea_orm(has_many = "super::purchase_invoice_line::Entity")]
    PurchaseInvoiceLine,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
