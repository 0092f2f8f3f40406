//! Derived-aggregate rules for the accounting domain.
//!
//! Each rule recomputes one cached column from its source rows: account
//! balances from journal entries, product stock from movements, invoice
//! totals from lines, and party balances from posted documents. The
//! recomputation functions are generic over [`sea_orm::ConnectionTrait`] so
//! callers run them inside the same transaction as the triggering write,
//! after the row has been persisted. Every rule is deterministic and
//! idempotent: the sum over an empty set is zero, and recomputing twice
//! without intervening writes stores the same value twice.

pub mod error;
pub mod invoice;
pub mod ledger;
pub mod party;
pub mod reports;
pub mod stock;

#[cfg(test)]
pub(crate) mod testing;
