use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One account's contribution to the trial balance. The stored balance is
/// reported in the column matching the account's normal side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrialBalanceRow {
    /// Account ID
    pub account_id: i32,
    /// Account code
    pub code: String,
    /// Account name
    pub name: String,
    /// Balance reported on the debit side (zero for credit-normal accounts)
    pub debit: Decimal,
    /// Balance reported on the credit side (zero for debit-normal accounts)
    pub credit: Decimal,
}

/// Trial balance over all active accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrialBalance {
    /// Per-account rows, ordered by account code
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column
    pub total_debit: Decimal,
    /// Sum of the credit column
    pub total_credit: Decimal,
}

impl TrialBalance {
    /// Builds a trial balance from rows, computing the column totals.
    pub fn new(rows: Vec<TrialBalanceRow>) -> Self {
        let total_debit = rows.iter().map(|r| r.debit).sum();
        let total_credit = rows.iter().map(|r| r.credit).sum();
        Self {
            rows,
            total_debit,
            total_credit,
        }
    }

    /// The books balance when both columns agree.
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, debit: i64, credit: i64) -> TrialBalanceRow {
        TrialBalanceRow {
            account_id: 1,
            code: code.to_string(),
            name: code.to_string(),
            debit: Decimal::new(debit, 2),
            credit: Decimal::new(credit, 2),
        }
    }

    #[test]
    fn totals_sum_both_columns() {
        let tb = TrialBalance::new(vec![row("1000", 50_000, 0), row("4000", 0, 50_000)]);
        assert_eq!(tb.total_debit, Decimal::new(50_000, 2));
        assert_eq!(tb.total_credit, Decimal::new(50_000, 2));
        assert!(tb.is_balanced());
    }

    #[test]
    fn empty_trial_balance_is_balanced() {
        let tb = TrialBalance::new(vec![]);
        assert_eq!(tb.total_debit, Decimal::ZERO);
        assert!(tb.is_balanced());
    }

    #[test]
    fn serializes_decimals_as_strings() {
        let tb = TrialBalance::new(vec![row("1000", 1_050, 0)]);
        let json = serde_json::to_value(&tb).unwrap();
        assert_eq!(json["rows"][0]["debit"], "10.50");
        assert_eq!(json["total_credit"], "0.00");
    }
}
