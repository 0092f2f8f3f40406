use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a payment was settled. `Card` is only offered on the customer side;
/// the API layer rejects it for supplier payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "cheque")]
    Cheque,
    #[sea_orm(string_value = "card")]
    Card,
}
