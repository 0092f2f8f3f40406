//! Report types shared between the compute layer and the backend handlers.
//! The compute crate builds these from aggregation queries; the handlers
//! serialize them as-is, so the shapes live in one place.

mod dashboard;
mod inventory;
mod trial_balance;

pub use dashboard::{DashboardSummary, InvoiceSummary};
pub use inventory::LowStockRow;
pub use trial_balance::{TrialBalance, TrialBalanceRow};
