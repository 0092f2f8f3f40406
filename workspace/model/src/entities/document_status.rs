use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status shared by invoices and payments.
///
/// Only posted documents contribute to computed balances. Transitions are
/// one-way: a document can never return to draft once it leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DocumentStatus {
    /// Allowed transitions: draft -> posted, draft -> cancelled,
    /// posted -> cancelled.
    pub fn can_transition_to(self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Draft, DocumentStatus::Posted)
                | (DocumentStatus::Draft, DocumentStatus::Cancelled)
                | (DocumentStatus::Posted, DocumentStatus::Cancelled)
        )
    }

    pub fn is_draft(self) -> bool {
        self == DocumentStatus::Draft
    }

    pub fn is_posted(self) -> bool {
        self == DocumentStatus::Posted
    }

    /// Stable string form, matching the stored database value.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Posted => "posted",
            DocumentStatus::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentStatus::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Draft.can_transition_to(Posted));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Posted.can_transition_to(Cancelled));
    }

    #[test]
    fn unposting_and_reviving_are_rejected() {
        assert!(!Posted.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Posted));
        assert!(!Draft.can_transition_to(Draft));
    }
}
