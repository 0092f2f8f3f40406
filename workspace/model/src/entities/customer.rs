use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A customer with a receivable balance.
///
/// `current_balance` is a cache: posted sales invoices minus posted customer
/// payments. Only the party balance rule writes it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub tax_number: Option<String>,
    /// Receivable control account in the chart of accounts.
    pub account_id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub credit_limit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub current_balance: Decimal,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Restrict"
    )]
    Account,
    #[sea_orm(has_many = "super::sales_invoice::Entity")]
    SalesInvoice,
    #[sea_orm(has_many = "super::customer_payment::Entity")]
    CustomerPayment,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::sales_invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesInvoice.def()
    }
}

impl Related<super::customer_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerPayment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
