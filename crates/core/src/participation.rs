// Participation domain types
//
// A participation is a user's request to take part in an event. It starts
// `pending` and moves once to `approved` or `rejected`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Approval state of a participation.
/// - `pending`: waiting for an admin decision
/// - `approved`: stamps settled (possibly zero)
/// - `rejected`: no stamps awarded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Waiting for an admin decision.
    #[default]
    Pending,
    /// Approved by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
}

impl ApprovalStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ApprovalStatus::Pending)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<&str> for ApprovalStatus {
    fn from(s: &str) -> Self {
        match s {
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Pending,
        }
    }
}

/// Participation - a user's join record for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Participation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub approval_status: ApprovalStatus,
    /// Set only when the participation is approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

/// Pending participation joined with the user and event it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PendingParticipation {
    #[serde(flatten)]
    pub participation: Participation,
    pub employee_code: String,
    pub event_title: String,
}

/// Result of a batch approve/reject.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BatchOutcome {
    /// Participations moved out of `pending`.
    pub processed: Vec<Uuid>,
    /// Ids that were missing or no longer pending.
    pub skipped: Vec<Uuid>,
}

impl BatchOutcome {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
