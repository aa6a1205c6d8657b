// Repository layer for database operations
// Decision: Plain reads and admin CRUD run on the pool; ledger-affecting
// operations go through PgUnitOfWork (one transaction each)

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::models::*;
use super::unit_of_work::UnitOfWork;

const EVENT_COLUMNS: &str = "id, title, description, date, location, start_time, end_time, \
     capacity, contact_name, notes, event_type, points, is_active, parent_event_id, created_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Start a unit of work backed by a transaction
    pub async fn begin(&self) -> Result<PgUnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, employee_code, password, role, stamps)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id, employee_code, password, role, stamps, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.employee_code)
        .bind(&input.password)
        .bind(&input.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, employee_code, password, role, stamps, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_employee_code(&self, employee_code: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, employee_code, password, role, stamps, created_at
            FROM users
            WHERE employee_code = $1
            "#,
        )
        .bind(employee_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, employee_code, password, role, stamps, created_at
            FROM users
            ORDER BY employee_code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: EventFields) -> Result<EventRow> {
        let sql = format!(
            r#"
            INSERT INTO events (id, title, description, date, location, start_time, end_time,
                                capacity, contact_name, notes, event_type, points, is_active,
                                parent_event_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, $13)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.date)
            .bind(&input.location)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.capacity)
            .bind(&input.contact_name)
            .bind(&input.notes)
            .bind(&input.event_type)
            .bind(input.points)
            .bind(input.parent_event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_event_by_title(&self, title: &str) -> Result<Option<EventRow>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE title = $1 ORDER BY created_at LIMIT 1"
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Whether any event names `id` as its parent
    pub async fn has_child_events(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM events WHERE parent_event_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// All events by date, undated events last
    pub async fn list_events(&self) -> Result<Vec<EventRow>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC NULLS LAST, created_at ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn update_event(&self, id: Uuid, input: EventFields) -> Result<Option<EventRow>> {
        let sql = format!(
            r#"
            UPDATE events
            SET
                title = $2,
                description = $3,
                date = $4,
                location = $5,
                start_time = $6,
                end_time = $7,
                capacity = $8,
                contact_name = $9,
                notes = $10,
                event_type = $11,
                points = $12,
                parent_event_id = $13
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.date)
            .bind(&input.location)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.capacity)
            .bind(&input.contact_name)
            .bind(&input.notes)
            .bind(&input.event_type)
            .bind(input.points)
            .bind(input.parent_event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn toggle_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let sql = format!(
            "UPDATE events SET is_active = NOT is_active WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Participations cascade; child events lose their parent link
    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Participations
    // ============================================

    pub async fn list_participations_for_user(&self, user_id: Uuid) -> Result<Vec<ParticipationRow>> {
        let rows = sqlx::query_as::<_, ParticipationRow>(
            r#"
            SELECT id, user_id, event_id, joined_at, approval_status, approved_at
            FROM participations
            WHERE user_id = $1
            ORDER BY joined_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Users who joined an event, by employee code
    pub async fn list_event_participants(&self, event_id: Uuid) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.employee_code, u.password, u.role, u.stamps, u.created_at
            FROM users u
            JOIN participations p ON p.user_id = u.id
            WHERE p.event_id = $1
            ORDER BY u.employee_code ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_pending_participations(
        &self,
        filter: PendingParticipationFilter,
    ) -> Result<Vec<PendingParticipationRow>> {
        let rows = sqlx::query_as::<_, PendingParticipationRow>(
            r#"
            SELECT p.id, p.user_id, p.event_id, p.joined_at, p.approval_status, p.approved_at,
                   u.employee_code, e.title AS event_title
            FROM participations p
            JOIN users u ON u.id = p.user_id
            JOIN events e ON e.id = p.event_id
            WHERE p.approval_status = 'pending'
              AND ($1::uuid IS NULL OR p.user_id = $1)
              AND ($2::uuid IS NULL OR p.event_id = $2)
            ORDER BY p.joined_at DESC
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Stamp history
    // ============================================

    pub async fn list_stamp_history(&self, user_id: Uuid, limit: i64) -> Result<Vec<StampHistoryRow>> {
        let rows = sqlx::query_as::<_, StampHistoryRow>(
            r#"
            SELECT id, user_id, change, reason, created_at
            FROM stamp_history
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn sum_stamp_history(&self, user_id: Uuid) -> Result<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(change), 0)::BIGINT FROM stamp_history WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }

    // ============================================
    // Rewards
    // ============================================

    pub async fn create_reward(&self, input: CreateRewardRow) -> Result<RewardRow> {
        let row = sqlx::query_as::<_, RewardRow>(
            r#"
            INSERT INTO rewards (id, name, required_stamps)
            VALUES ($1, $2, $3)
            RETURNING id, name, required_stamps, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(input.required_stamps)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_reward(&self, id: Uuid) -> Result<Option<RewardRow>> {
        let row = sqlx::query_as::<_, RewardRow>(
            "SELECT id, name, required_stamps, created_at FROM rewards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_reward_by_name(&self, name: &str) -> Result<Option<RewardRow>> {
        let row = sqlx::query_as::<_, RewardRow>(
            "SELECT id, name, required_stamps, created_at FROM rewards WHERE name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_rewards(&self) -> Result<Vec<RewardRow>> {
        let rows = sqlx::query_as::<_, RewardRow>(
            r#"
            SELECT id, name, required_stamps, created_at
            FROM rewards
            ORDER BY required_stamps ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Reward requests cascade; stamp history is untouched
    pub async fn delete_reward(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rewards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Reward requests
    // ============================================

    pub async fn list_reward_requests_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RewardRequestRow>> {
        let rows = sqlx::query_as::<_, RewardRequestRow>(
            r#"
            SELECT id, user_id, reward_id, status, created_at
            FROM reward_requests
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_pending_reward_requests(&self) -> Result<Vec<RewardRequestRow>> {
        let rows = sqlx::query_as::<_, RewardRequestRow>(
            r#"
            SELECT id, user_id, reward_id, status, created_at
            FROM reward_requests
            WHERE status = 'pending'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn set_reward_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<RewardRequestRow>> {
        let row = sqlx::query_as::<_, RewardRequestRow>(
            r#"
            UPDATE reward_requests
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, reward_id, status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

/// Transaction-backed unit of work. Rolled back on drop unless committed.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_user(&mut self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, employee_code, password, role, stamps, created_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn get_event(&mut self, id: Uuid) -> Result<Option<EventRow>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row)
    }

    async fn find_participation(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<ParticipationRow>> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            r#"
            SELECT id, user_id, event_id, joined_at, approval_status, approved_at
            FROM participations
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn lock_participation(&mut self, id: Uuid) -> Result<Option<ParticipationRow>> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            r#"
            SELECT id, user_id, event_id, joined_at, approval_status, approved_at
            FROM participations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn insert_participation(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<ParticipationRow> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            r#"
            INSERT INTO participations (id, user_id, event_id, approval_status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, user_id, event_id, joined_at, approval_status, approved_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn update_participation_status(
        &mut self,
        id: Uuid,
        status: &str,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<ParticipationRow> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            r#"
            UPDATE participations
            SET approval_status = $2, approved_at = $3
            WHERE id = $1
            RETURNING id, user_id, event_id, joined_at, approval_status, approved_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(approved_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn insert_stamp_history(
        &mut self,
        input: CreateStampHistoryRow,
    ) -> Result<StampHistoryRow> {
        let row = sqlx::query_as::<_, StampHistoryRow>(
            r#"
            INSERT INTO stamp_history (id, user_id, change, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, change, reason, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.user_id)
        .bind(input.change)
        .bind(&input.reason)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn add_user_stamps(&mut self, user_id: Uuid, delta: i32) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET stamps = stamps + $2
            WHERE id = $1
            RETURNING id, employee_code, password, role, stamps, created_at
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn get_reward(&mut self, id: Uuid) -> Result<Option<RewardRow>> {
        let row = sqlx::query_as::<_, RewardRow>(
            "SELECT id, name, required_stamps, created_at FROM rewards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn insert_reward_request(
        &mut self,
        user_id: Uuid,
        reward_id: Uuid,
    ) -> Result<RewardRequestRow> {
        let row = sqlx::query_as::<_, RewardRequestRow>(
            r#"
            INSERT INTO reward_requests (id, user_id, reward_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, user_id, reward_id, status, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(reward_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
