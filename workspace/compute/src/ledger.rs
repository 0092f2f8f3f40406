//! Ledger rules: an account's balance is the signed sum of its journal
//! entries, per the account's normal side.

use model::entities::journal_entry::{self, EntrySide};
use model::entities::account;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, instrument, trace};

use crate::error::{ComputeError, Result};

/// Sums the entries on one side of an account's ledger. Absence of entries
/// yields zero.
async fn side_total<C>(conn: &C, account_id: i32, side: EntrySide) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = journal_entry::Entity::find()
        .select_only()
        .column_as(journal_entry::Column::Amount.sum(), "total")
        .filter(journal_entry::Column::AccountId.eq(account_id))
        .filter(journal_entry::Column::Side.eq(side))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

/// Recomputes and stores the account's balance from its journal entries.
///
/// The account row is locked first so that concurrent postings against the
/// same account serialize on the read-aggregate-write cycle. Run this inside
/// the transaction that wrote the triggering entry.
#[instrument(skip(conn))]
pub async fn recompute_account_balance<C>(conn: &C, account_id: i32) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    trace!("Recomputing balance for account_id={}", account_id);

    let account = account::Entity::find_by_id(account_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ComputeError::not_found("account", account_id))?;

    let debit_total = side_total(conn, account_id, EntrySide::Debit).await?;
    let credit_total = side_total(conn, account_id, EntrySide::Credit).await?;
    let balance = account.normal_balance.signed_balance(debit_total, credit_total);

    debug!(
        "Account {} ({}): debit={}, credit={}, balance={}",
        account.code, account_id, debit_total, credit_total, balance
    );

    let mut active: account::ActiveModel = account.into();
    active.balance = Set(balance);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use model::entities::account::NormalBalance;

    #[tokio::test]
    async fn empty_entry_set_yields_zero() {
        let db = testing::setup_db().await;
        let account = testing::insert_account(&db, "1000", NormalBalance::Debit).await;

        let updated = recompute_account_balance(&db, account.id).await.unwrap();
        assert_eq!(updated.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn debit_normal_account_sums_debits_minus_credits() {
        let db = testing::setup_db().await;
        let account = testing::insert_account(&db, "1000", NormalBalance::Debit).await;
        testing::insert_entry(&db, account.id, EntrySide::Debit, Decimal::new(30_000, 2)).await;
        testing::insert_entry(&db, account.id, EntrySide::Debit, Decimal::new(20_000, 2)).await;
        testing::insert_entry(&db, account.id, EntrySide::Credit, Decimal::new(12_500, 2)).await;

        let updated = recompute_account_balance(&db, account.id).await.unwrap();
        assert_eq!(updated.balance, Decimal::new(37_500, 2));
    }

    #[tokio::test]
    async fn credit_normal_account_negates() {
        let db = testing::setup_db().await;
        let account = testing::insert_account(&db, "4000", NormalBalance::Credit).await;
        testing::insert_entry(&db, account.id, EntrySide::Credit, Decimal::new(50_000, 2)).await;
        testing::insert_entry(&db, account.id, EntrySide::Debit, Decimal::new(10_000, 2)).await;

        let updated = recompute_account_balance(&db, account.id).await.unwrap();
        assert_eq!(updated.balance, Decimal::new(40_000, 2));
    }

    #[tokio::test]
    async fn recomputation_is_idempotent() {
        let db = testing::setup_db().await;
        let account = testing::insert_account(&db, "1000", NormalBalance::Debit).await;
        testing::insert_entry(&db, account.id, EntrySide::Debit, Decimal::new(7_700, 2)).await;

        let first = recompute_account_balance(&db, account.id).await.unwrap();
        let second = recompute_account_balance(&db, account.id).await.unwrap();
        assert_eq!(first.balance, second.balance);
    }

    #[tokio::test]
    async fn unknown_account_is_reported() {
        let db = testing::setup_db().await;
        let err = recompute_account_balance(&db, 9999).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
