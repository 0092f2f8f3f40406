use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Classification of an account in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Which side increases the account's balance, per accounting convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(6))")]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl NormalBalance {
    /// Signed balance from the debit and credit totals: debit-normal
    /// accounts carry `debits - credits`, credit-normal the negation.
    pub fn signed_balance(self, debit_total: Decimal, credit_total: Decimal) -> Decimal {
        match self {
            NormalBalance::Debit => debit_total - credit_total,
            NormalBalance::Credit => credit_total - debit_total,
        }
    }
}

/// An account in the chart of accounts.
///
/// `balance` is a cache derived from the account's journal entries; it is
/// only ever written by the balance recomputation rule.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    /// Optional parent for hierarchical charts of accounts.
    pub parent_id: Option<i32>,
    pub description: Option<String>,
    pub normal_balance: NormalBalance,
    /// Derived: signed sum of journal entries per the normal side.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub balance: Decimal,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
    #[sea_orm(has_many = "super::journal_entry::Entity")]
    JournalEntry,
    #[sea_orm(has_many = "super::customer::Entity")]
    Customer,
    #[sea_orm(has_many = "super::supplier::Entity")]
    Supplier,
}

impl Related<super::journal_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntry.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_normal_balance_is_debits_minus_credits() {
        let d = Decimal::new(10_000, 2);
        let c = Decimal::new(2_500, 2);
        assert_eq!(
            NormalBalance::Debit.signed_balance(d, c),
            Decimal::new(7_500, 2)
        );
    }

    #[test]
    fn credit_normal_balance_is_credits_minus_debits() {
        let d = Decimal::new(10_000, 2);
        let c = Decimal::new(2_500, 2);
        assert_eq!(
            NormalBalance::Credit.signed_balance(d, c),
            Decimal::new(-7_500, 2)
        );
    }

    #[test]
    fn empty_totals_give_zero() {
        assert_eq!(
            NormalBalance::Debit.signed_balance(Decimal::ZERO, Decimal::ZERO),
            Decimal::ZERO
        );
    }
}
