// Stamp Rally core domain
//
// This crate provides the DB-agnostic domain of the engagement portal:
// users earn stamps for approved event participation and spend them on rewards.
//
// Key design decisions:
// - Domain entity types (User, Event, Participation, Reward, ...) are defined here
// - Roles and statuses are closed enums; storage rows keep their text form
// - Award rules are pure functions so every storage backend applies them identically
// - Error handling distinguishes recoverable conditions (not found, permission,
//   invalid input, failed precondition) from storage failures

pub mod award;
pub mod error;
pub mod event;
pub mod input;
pub mod participation;
pub mod reward;
pub mod stamp;
pub mod telemetry;
pub mod user;
pub mod view;

// Re-exports for convenience
pub use award::{
    decide_award, redemption_reason, rejection_reason, Award, AwardKind, DEFAULT_GRANT_REASON,
};
pub use error::{Entity, PortalError, Precondition, Result};
pub use event::{Event, EventType, DEFAULT_EVENT_POINTS};
pub use input::{parse_optional_date, parse_optional_time, NumericInput};
pub use participation::{ApprovalStatus, BatchOutcome, Participation, PendingParticipation};
pub use reward::{RequestStatus, Reward, RewardRequest};
pub use stamp::{LedgerBalance, StampHistoryEntry};
pub use user::{Actor, User, UserRole};
pub use view::{Dashboard, EventDetail, EventSummary, RecentEvent};
