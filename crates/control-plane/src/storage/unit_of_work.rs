// Unit of work for ledger-affecting operations
// Decision: Every balance mutation runs inside one unit of work so history and
// cached balance commit together
// Decision: Dropping a unit of work without commit discards its changes
//
// Implementations:
// - PgUnitOfWork: a PostgreSQL transaction; rows read through `lock_*` are
//   held with SELECT ... FOR UPDATE until commit
// - MemoryUnitOfWork: exclusive access to the in-memory tables with a staged copy

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::*;

#[async_trait]
pub trait UnitOfWork: Send {
    /// Fetch a user and hold it until commit. Serializes balance changes per user.
    async fn lock_user(&mut self, id: Uuid) -> Result<Option<UserRow>>;

    async fn get_event(&mut self, id: Uuid) -> Result<Option<EventRow>>;

    async fn find_participation(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<ParticipationRow>>;

    /// Fetch a participation and hold it until commit.
    async fn lock_participation(&mut self, id: Uuid) -> Result<Option<ParticipationRow>>;

    async fn insert_participation(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<ParticipationRow>;

    async fn update_participation_status(
        &mut self,
        id: Uuid,
        status: &str,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<ParticipationRow>;

    async fn insert_stamp_history(&mut self, input: CreateStampHistoryRow)
        -> Result<StampHistoryRow>;

    /// Add `delta` to the cached balance and return the updated user.
    async fn add_user_stamps(&mut self, user_id: Uuid, delta: i32) -> Result<UserRow>;

    async fn get_reward(&mut self, id: Uuid) -> Result<Option<RewardRow>>;

    async fn insert_reward_request(
        &mut self,
        user_id: Uuid,
        reward_id: Uuid,
    ) -> Result<RewardRequestRow>;

    /// Make every change visible. Without this, changes are discarded on drop.
    async fn commit(self: Box<Self>) -> Result<()>;
}
