// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use stamprally_core::{
    ApprovalStatus, Event, EventType, Participation, PendingParticipation, RequestStatus, Reward,
    RewardRequest, StampHistoryEntry, User, UserRole,
};
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub employee_code: String,
    pub password: String,
    pub role: String,
    pub stamps: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub employee_code: String,
    pub password: String,
    pub role: String,
}

// ============================================
// Events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub capacity: Option<i32>,
    pub contact_name: Option<String>,
    pub notes: Option<String>,
    pub event_type: String,
    pub points: i32,
    pub is_active: bool,
    pub parent_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Full set of editable event columns. Used for both insert and update.
#[derive(Debug, Clone, Default)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub capacity: Option<i32>,
    pub contact_name: Option<String>,
    pub notes: Option<String>,
    pub event_type: String,
    pub points: i32,
    pub parent_event_id: Option<Uuid>,
}

impl EventFields {
    /// Editable columns of an existing row.
    pub fn from_row(row: &EventRow) -> Self {
        Self {
            title: row.title.clone(),
            description: row.description.clone(),
            date: row.date,
            location: row.location.clone(),
            start_time: row.start_time,
            end_time: row.end_time,
            capacity: row.capacity,
            contact_name: row.contact_name.clone(),
            notes: row.notes.clone(),
            event_type: row.event_type.clone(),
            points: row.points,
            parent_event_id: row.parent_event_id,
        }
    }
}

// ============================================
// Participations
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ParticipationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub approval_status: String,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Pending participation joined with user and event for the admin queue
#[derive(Debug, Clone, FromRow)]
pub struct PendingParticipationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub approval_status: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub employee_code: String,
    pub event_title: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PendingParticipationFilter {
    pub user_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

// ============================================
// Stamp history
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct StampHistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub change: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateStampHistoryRow {
    pub user_id: Uuid,
    pub change: i32,
    pub reason: String,
}

// ============================================
// Rewards
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct RewardRow {
    pub id: Uuid,
    pub name: String,
    pub required_stamps: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateRewardRow {
    pub name: String,
    pub required_stamps: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct RewardRequestRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Row to domain conversions
// ============================================

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            employee_code: row.employee_code,
            role: UserRole::from(row.role.as_str()),
            stamps: row.stamps,
            created_at: row.created_at,
        }
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            location: row.location,
            start_time: row.start_time,
            end_time: row.end_time,
            capacity: row.capacity,
            contact_name: row.contact_name,
            notes: row.notes,
            event_type: EventType::from(row.event_type.as_str()),
            points: row.points,
            is_active: row.is_active,
            parent_event_id: row.parent_event_id,
            created_at: row.created_at,
        }
    }
}

impl From<ParticipationRow> for Participation {
    fn from(row: ParticipationRow) -> Self {
        Participation {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            joined_at: row.joined_at,
            approval_status: ApprovalStatus::from(row.approval_status.as_str()),
            approved_at: row.approved_at,
        }
    }
}

impl From<PendingParticipationRow> for PendingParticipation {
    fn from(row: PendingParticipationRow) -> Self {
        PendingParticipation {
            participation: Participation {
                id: row.id,
                user_id: row.user_id,
                event_id: row.event_id,
                joined_at: row.joined_at,
                approval_status: ApprovalStatus::from(row.approval_status.as_str()),
                approved_at: row.approved_at,
            },
            employee_code: row.employee_code,
            event_title: row.event_title,
        }
    }
}

impl From<StampHistoryRow> for StampHistoryEntry {
    fn from(row: StampHistoryRow) -> Self {
        StampHistoryEntry {
            id: row.id,
            user_id: row.user_id,
            change: row.change,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

impl From<RewardRow> for Reward {
    fn from(row: RewardRow) -> Self {
        Reward {
            id: row.id,
            name: row.name,
            required_stamps: row.required_stamps,
            created_at: row.created_at,
        }
    }
}

impl From<RewardRequestRow> for RewardRequest {
    fn from(row: RewardRequestRow) -> Self {
        RewardRequest {
            id: row.id,
            user_id: row.user_id,
            reward_id: row.reward_id,
            status: RequestStatus::from(row.status.as_str()),
            created_at: row.created_at,
        }
    }
}
