// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
// Decision: Units of work are boxed trait objects so services stay backend-agnostic
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;
use super::unit_of_work::UnitOfWork;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Apply migrations. No-op for in-memory.
    pub async fn migrate(&self) -> Result<()> {
        match self {
            Self::Postgres(db) => db.migrate().await,
            Self::InMemory(_) => Ok(()),
        }
    }

    /// Start a unit of work for a ledger-affecting operation
    pub async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        match self {
            Self::Postgres(db) => Ok(Box::new(db.begin().await?)),
            Self::InMemory(db) => Ok(Box::new(db.begin().await?)),
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_employee_code(&self, employee_code: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_employee_code(employee_code).await,
            Self::InMemory(db) => db.get_user_by_employee_code(employee_code).await,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        match self {
            Self::Postgres(db) => db.list_users().await,
            Self::InMemory(db) => db.list_users().await,
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: EventFields) -> Result<EventRow> {
        match self {
            Self::Postgres(db) => db.create_event(input).await,
            Self::InMemory(db) => db.create_event(input).await,
        }
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.get_event(id).await,
            Self::InMemory(db) => db.get_event(id).await,
        }
    }

    pub async fn get_event_by_title(&self, title: &str) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.get_event_by_title(title).await,
            Self::InMemory(db) => db.get_event_by_title(title).await,
        }
    }

    pub async fn has_child_events(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.has_child_events(id).await,
            Self::InMemory(db) => db.has_child_events(id).await,
        }
    }

    pub async fn list_events(&self) -> Result<Vec<EventRow>> {
        match self {
            Self::Postgres(db) => db.list_events().await,
            Self::InMemory(db) => db.list_events().await,
        }
    }

    pub async fn update_event(&self, id: Uuid, input: EventFields) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.update_event(id, input).await,
            Self::InMemory(db) => db.update_event(id, input).await,
        }
    }

    pub async fn toggle_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.toggle_event(id).await,
            Self::InMemory(db) => db.toggle_event(id).await,
        }
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_event(id).await,
            Self::InMemory(db) => db.delete_event(id).await,
        }
    }

    // ============================================
    // Participations
    // ============================================

    pub async fn list_participations_for_user(&self, user_id: Uuid) -> Result<Vec<ParticipationRow>> {
        match self {
            Self::Postgres(db) => db.list_participations_for_user(user_id).await,
            Self::InMemory(db) => db.list_participations_for_user(user_id).await,
        }
    }

    pub async fn list_event_participants(&self, event_id: Uuid) -> Result<Vec<UserRow>> {
        match self {
            Self::Postgres(db) => db.list_event_participants(event_id).await,
            Self::InMemory(db) => db.list_event_participants(event_id).await,
        }
    }

    pub async fn list_pending_participations(
        &self,
        filter: PendingParticipationFilter,
    ) -> Result<Vec<PendingParticipationRow>> {
        match self {
            Self::Postgres(db) => db.list_pending_participations(filter).await,
            Self::InMemory(db) => db.list_pending_participations(filter).await,
        }
    }

    // ============================================
    // Stamp history
    // ============================================

    pub async fn list_stamp_history(&self, user_id: Uuid, limit: i64) -> Result<Vec<StampHistoryRow>> {
        match self {
            Self::Postgres(db) => db.list_stamp_history(user_id, limit).await,
            Self::InMemory(db) => db.list_stamp_history(user_id, limit).await,
        }
    }

    pub async fn sum_stamp_history(&self, user_id: Uuid) -> Result<i64> {
        match self {
            Self::Postgres(db) => db.sum_stamp_history(user_id).await,
            Self::InMemory(db) => db.sum_stamp_history(user_id).await,
        }
    }

    // ============================================
    // Rewards
    // ============================================

    pub async fn create_reward(&self, input: CreateRewardRow) -> Result<RewardRow> {
        match self {
            Self::Postgres(db) => db.create_reward(input).await,
            Self::InMemory(db) => db.create_reward(input).await,
        }
    }

    pub async fn get_reward(&self, id: Uuid) -> Result<Option<RewardRow>> {
        match self {
            Self::Postgres(db) => db.get_reward(id).await,
            Self::InMemory(db) => db.get_reward(id).await,
        }
    }

    pub async fn get_reward_by_name(&self, name: &str) -> Result<Option<RewardRow>> {
        match self {
            Self::Postgres(db) => db.get_reward_by_name(name).await,
            Self::InMemory(db) => db.get_reward_by_name(name).await,
        }
    }

    pub async fn list_rewards(&self) -> Result<Vec<RewardRow>> {
        match self {
            Self::Postgres(db) => db.list_rewards().await,
            Self::InMemory(db) => db.list_rewards().await,
        }
    }

    pub async fn delete_reward(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_reward(id).await,
            Self::InMemory(db) => db.delete_reward(id).await,
        }
    }

    // ============================================
    // Reward requests
    // ============================================

    pub async fn list_reward_requests_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RewardRequestRow>> {
        match self {
            Self::Postgres(db) => db.list_reward_requests_for_user(user_id, limit).await,
            Self::InMemory(db) => db.list_reward_requests_for_user(user_id, limit).await,
        }
    }

    pub async fn list_pending_reward_requests(&self) -> Result<Vec<RewardRequestRow>> {
        match self {
            Self::Postgres(db) => db.list_pending_reward_requests().await,
            Self::InMemory(db) => db.list_pending_reward_requests().await,
        }
    }

    pub async fn set_reward_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<RewardRequestRow>> {
        match self {
            Self::Postgres(db) => db.set_reward_request_status(id, status).await,
            Self::InMemory(db) => db.set_reward_request_status(id, status).await,
        }
    }
}
