// In-memory storage implementation for dev mode
// Decision: One async mutex guards all tables; a unit of work holds it for its
// whole lifetime, edits in place and keeps an undo log for rollback
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// This implementation mirrors the PostgreSQL repository API, including the
// cascade rules of the schema, so the portal runs without a database.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::models::*;
use super::unit_of_work::UnitOfWork;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRow>,
    events: HashMap<Uuid, EventRow>,
    participations: HashMap<Uuid, ParticipationRow>,
    // Insertion order is history order
    stamp_history: Vec<StampHistoryRow>,
    rewards: HashMap<Uuid, RewardRow>,
    reward_requests: Vec<RewardRequestRow>,
}

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// Start a unit of work. Waits until any other unit of work finishes.
    pub async fn begin(&self) -> Result<MemoryUnitOfWork> {
        let tables = self.tables.clone().lock_owned().await;
        Ok(MemoryUnitOfWork {
            tables,
            undo: Vec::new(),
        })
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|u| u.employee_code == input.employee_code)
        {
            return Err(anyhow!(
                "employee code {} already exists",
                input.employee_code
            ));
        }
        let row = UserRow {
            id: Uuid::now_v7(),
            employee_code: input.employee_code,
            password: input.password,
            role: input.role,
            stamps: 0,
            created_at: Self::now(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    pub async fn get_user_by_employee_code(&self, employee_code: &str) -> Result<Option<UserRow>> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.employee_code == employee_code)
            .cloned())
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        let mut users: Vec<UserRow> = self.tables.lock().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        Ok(users)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: EventFields) -> Result<EventRow> {
        let row = EventRow {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
            start_time: input.start_time,
            end_time: input.end_time,
            capacity: input.capacity,
            contact_name: input.contact_name,
            notes: input.notes,
            event_type: input.event_type,
            points: input.points,
            is_active: true,
            parent_event_id: input.parent_event_id,
            created_at: Self::now(),
        };
        self.tables
            .lock()
            .await
            .events
            .insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    pub async fn get_event_by_title(&self, title: &str) -> Result<Option<EventRow>> {
        Ok(self
            .tables
            .lock()
            .await
            .events
            .values()
            .filter(|e| e.title == title)
            .min_by_key(|e| e.created_at)
            .cloned())
    }

    pub async fn has_child_events(&self, id: Uuid) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .events
            .values()
            .any(|e| e.parent_event_id == Some(id)))
    }

    /// All events by date, undated events last
    pub async fn list_events(&self) -> Result<Vec<EventRow>> {
        let mut events: Vec<EventRow> =
            self.tables.lock().await.events.values().cloned().collect();
        events.sort_by(|a, b| {
            let by_date = match (a.date, b.date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_date.then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(events)
    }

    pub async fn update_event(&self, id: Uuid, input: EventFields) -> Result<Option<EventRow>> {
        let mut tables = self.tables.lock().await;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };
        event.title = input.title;
        event.description = input.description;
        event.date = input.date;
        event.location = input.location;
        event.start_time = input.start_time;
        event.end_time = input.end_time;
        event.capacity = input.capacity;
        event.contact_name = input.contact_name;
        event.notes = input.notes;
        event.event_type = input.event_type;
        event.points = input.points;
        event.parent_event_id = input.parent_event_id;
        Ok(Some(event.clone()))
    }

    pub async fn toggle_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.events.get_mut(&id).map(|event| {
            event.is_active = !event.is_active;
            event.clone()
        }))
    }

    /// Participations cascade; child events lose their parent link
    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.events.remove(&id).is_none() {
            return Ok(false);
        }
        tables.participations.retain(|_, p| p.event_id != id);
        for event in tables.events.values_mut() {
            if event.parent_event_id == Some(id) {
                event.parent_event_id = None;
            }
        }
        Ok(true)
    }

    // ============================================
    // Participations
    // ============================================

    pub async fn list_participations_for_user(&self, user_id: Uuid) -> Result<Vec<ParticipationRow>> {
        let mut rows: Vec<ParticipationRow> = self
            .tables
            .lock()
            .await
            .participations
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.joined_at.cmp(&a.joined_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    /// Users who joined an event, by employee code
    pub async fn list_event_participants(&self, event_id: Uuid) -> Result<Vec<UserRow>> {
        let tables = self.tables.lock().await;
        let mut users: Vec<UserRow> = tables
            .participations
            .values()
            .filter(|p| p.event_id == event_id)
            .filter_map(|p| tables.users.get(&p.user_id).cloned())
            .collect();
        users.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        Ok(users)
    }

    pub async fn list_pending_participations(
        &self,
        filter: PendingParticipationFilter,
    ) -> Result<Vec<PendingParticipationRow>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<PendingParticipationRow> = tables
            .participations
            .values()
            .filter(|p| p.approval_status == "pending")
            .filter(|p| filter.user_id.map_or(true, |id| p.user_id == id))
            .filter(|p| filter.event_id.map_or(true, |id| p.event_id == id))
            .filter_map(|p| {
                let user = tables.users.get(&p.user_id)?;
                let event = tables.events.get(&p.event_id)?;
                Some(PendingParticipationRow {
                    id: p.id,
                    user_id: p.user_id,
                    event_id: p.event_id,
                    joined_at: p.joined_at,
                    approval_status: p.approval_status.clone(),
                    approved_at: p.approved_at,
                    employee_code: user.employee_code.clone(),
                    event_title: event.title.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.joined_at.cmp(&a.joined_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    // ============================================
    // Stamp history
    // ============================================

    pub async fn list_stamp_history(&self, user_id: Uuid, limit: i64) -> Result<Vec<StampHistoryRow>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables
            .lock()
            .await
            .stamp_history
            .iter()
            .rev()
            .filter(|h| h.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    pub async fn sum_stamp_history(&self, user_id: Uuid) -> Result<i64> {
        Ok(self
            .tables
            .lock()
            .await
            .stamp_history
            .iter()
            .filter(|h| h.user_id == user_id)
            .map(|h| i64::from(h.change))
            .sum())
    }

    // ============================================
    // Rewards
    // ============================================

    pub async fn create_reward(&self, input: CreateRewardRow) -> Result<RewardRow> {
        if input.required_stamps <= 0 {
            return Err(anyhow!("required_stamps must be positive"));
        }
        let row = RewardRow {
            id: Uuid::now_v7(),
            name: input.name,
            required_stamps: input.required_stamps,
            created_at: Self::now(),
        };
        self.tables
            .lock()
            .await
            .rewards
            .insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_reward(&self, id: Uuid) -> Result<Option<RewardRow>> {
        Ok(self.tables.lock().await.rewards.get(&id).cloned())
    }

    pub async fn get_reward_by_name(&self, name: &str) -> Result<Option<RewardRow>> {
        Ok(self
            .tables
            .lock()
            .await
            .rewards
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    pub async fn list_rewards(&self) -> Result<Vec<RewardRow>> {
        let mut rewards: Vec<RewardRow> =
            self.tables.lock().await.rewards.values().cloned().collect();
        rewards.sort_by(|a, b| {
            a.required_stamps
                .cmp(&b.required_stamps)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rewards)
    }

    /// Reward requests cascade; stamp history is untouched
    pub async fn delete_reward(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.rewards.remove(&id).is_none() {
            return Ok(false);
        }
        tables.reward_requests.retain(|r| r.reward_id != id);
        Ok(true)
    }

    // ============================================
    // Reward requests
    // ============================================

    pub async fn list_reward_requests_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RewardRequestRow>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables
            .lock()
            .await
            .reward_requests
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    pub async fn list_pending_reward_requests(&self) -> Result<Vec<RewardRequestRow>> {
        Ok(self
            .tables
            .lock()
            .await
            .reward_requests
            .iter()
            .rev()
            .filter(|r| r.status == "pending")
            .cloned()
            .collect())
    }

    pub async fn set_reward_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<RewardRequestRow>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .reward_requests
            .iter_mut()
            .find(|r| r.id == id)
            .map(|request| {
                request.status = status.to_string();
                request.clone()
            }))
    }
}

/// Reverse of one edit made inside a unit of work
enum Undo {
    User(UserRow),
    ParticipationInserted(Uuid),
    Participation(ParticipationRow),
    HistoryPushed,
    RequestPushed,
}

/// Exclusive access to the tables. Edits apply in place and are recorded in
/// `undo`; dropping without commit replays the log backwards.
pub struct MemoryUnitOfWork {
    tables: OwnedMutexGuard<Tables>,
    undo: Vec<Undo>,
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        while let Some(undo) = self.undo.pop() {
            match undo {
                Undo::User(row) => {
                    self.tables.users.insert(row.id, row);
                }
                Undo::ParticipationInserted(id) => {
                    self.tables.participations.remove(&id);
                }
                Undo::Participation(row) => {
                    self.tables.participations.insert(row.id, row);
                }
                Undo::HistoryPushed => {
                    self.tables.stamp_history.pop();
                }
                Undo::RequestPushed => {
                    self.tables.reward_requests.pop();
                }
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_user(&mut self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.tables.users.get(&id).cloned())
    }

    async fn get_event(&mut self, id: Uuid) -> Result<Option<EventRow>> {
        Ok(self.tables.events.get(&id).cloned())
    }

    async fn find_participation(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<ParticipationRow>> {
        Ok(self
            .tables
            .participations
            .values()
            .find(|p| p.user_id == user_id && p.event_id == event_id)
            .cloned())
    }

    async fn lock_participation(&mut self, id: Uuid) -> Result<Option<ParticipationRow>> {
        Ok(self.tables.participations.get(&id).cloned())
    }

    async fn insert_participation(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<ParticipationRow> {
        if self
            .tables
            .participations
            .values()
            .any(|p| p.user_id == user_id && p.event_id == event_id)
        {
            return Err(anyhow!(
                "participation for user {user_id} and event {event_id} already exists"
            ));
        }
        let row = ParticipationRow {
            id: Uuid::now_v7(),
            user_id,
            event_id,
            joined_at: InMemoryDatabase::now(),
            approval_status: "pending".to_string(),
            approved_at: None,
        };
        self.tables.participations.insert(row.id, row.clone());
        self.undo.push(Undo::ParticipationInserted(row.id));
        Ok(row)
    }

    async fn update_participation_status(
        &mut self,
        id: Uuid,
        status: &str,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<ParticipationRow> {
        let participation = self
            .tables
            .participations
            .get_mut(&id)
            .ok_or_else(|| anyhow!("participation {id} not found"))?;
        let previous = participation.clone();
        participation.approval_status = status.to_string();
        participation.approved_at = approved_at;
        let updated = participation.clone();
        self.undo.push(Undo::Participation(previous));
        Ok(updated)
    }

    async fn insert_stamp_history(
        &mut self,
        input: CreateStampHistoryRow,
    ) -> Result<StampHistoryRow> {
        if !self.tables.users.contains_key(&input.user_id) {
            return Err(anyhow!("user {} not found", input.user_id));
        }
        let row = StampHistoryRow {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            change: input.change,
            reason: input.reason,
            created_at: InMemoryDatabase::now(),
        };
        self.tables.stamp_history.push(row.clone());
        self.undo.push(Undo::HistoryPushed);
        Ok(row)
    }

    async fn add_user_stamps(&mut self, user_id: Uuid, delta: i32) -> Result<UserRow> {
        let user = self
            .tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| anyhow!("user {user_id} not found"))?;
        let stamps = user
            .stamps
            .checked_add(delta)
            .ok_or_else(|| anyhow!("stamp balance out of range for user {user_id}"))?;
        let previous = user.clone();
        user.stamps = stamps;
        let updated = user.clone();
        self.undo.push(Undo::User(previous));
        Ok(updated)
    }

    async fn get_reward(&mut self, id: Uuid) -> Result<Option<RewardRow>> {
        Ok(self.tables.rewards.get(&id).cloned())
    }

    async fn insert_reward_request(
        &mut self,
        user_id: Uuid,
        reward_id: Uuid,
    ) -> Result<RewardRequestRow> {
        let row = RewardRequestRow {
            id: Uuid::now_v7(),
            user_id,
            reward_id,
            status: "pending".to_string(),
            created_at: InMemoryDatabase::now(),
        };
        self.tables.reward_requests.push(row.clone());
        self.undo.push(Undo::RequestPushed);
        Ok(row)
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.undo.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(db: &InMemoryDatabase, code: &str) -> UserRow {
        db.create_user(CreateUserRow {
            employee_code: code.to_string(),
            password: "pw".to_string(),
            role: "user".to_string(),
        })
        .await
        .unwrap()
    }

    fn event_fields(title: &str) -> EventFields {
        EventFields {
            title: title.to_string(),
            event_type: "single".to_string(),
            points: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;

        let mut uow = Box::new(db.begin().await.unwrap());
        uow.add_user_stamps(user.id, 3).await.unwrap();
        uow.insert_stamp_history(CreateStampHistoryRow {
            user_id: user.id,
            change: 3,
            reason: "test".to_string(),
        })
        .await
        .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 3);
        assert_eq!(db.sum_stamp_history(user.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_drop_discards_changes() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;

        {
            let mut uow = db.begin().await.unwrap();
            uow.add_user_stamps(user.id, 5).await.unwrap();
        }

        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 0);
        assert!(db.list_stamp_history(user.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_reverts_every_edit() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;
        let event = db.create_event(event_fields("Golf")).await.unwrap();
        let reward = db
            .create_reward(CreateRewardRow {
                name: "Towel".to_string(),
                required_stamps: 1,
            })
            .await
            .unwrap();

        let mut uow = Box::new(db.begin().await.unwrap());
        let joined = uow.insert_participation(user.id, event.id).await.unwrap();
        uow.commit().await.unwrap();

        {
            let mut uow = db.begin().await.unwrap();
            uow.update_participation_status(joined.id, "approved", Some(Utc::now()))
                .await
                .unwrap();
            uow.insert_stamp_history(CreateStampHistoryRow {
                user_id: user.id,
                change: 2,
                reason: "Golf: participation approved".to_string(),
            })
            .await
            .unwrap();
            uow.add_user_stamps(user.id, 2).await.unwrap();
            uow.insert_reward_request(user.id, reward.id).await.unwrap();
            uow.insert_participation(user.id, Uuid::now_v7())
                .await
                .unwrap();
        }

        let participations = db.list_participations_for_user(user.id).await.unwrap();
        assert_eq!(participations.len(), 1);
        assert_eq!(participations[0].approval_status, "pending");
        assert!(participations[0].approved_at.is_none());
        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 0);
        assert_eq!(db.sum_stamp_history(user.id).await.unwrap(), 0);
        assert!(db
            .list_reward_requests_for_user(user.id, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_balance_overflow_is_an_error() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;

        let mut uow = db.begin().await.unwrap();
        uow.add_user_stamps(user.id, i32::MAX).await.unwrap();
        assert!(uow.add_user_stamps(user.id, 1).await.is_err());
        assert!(uow.add_user_stamps(user.id, i32::MIN).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_participation_rejected() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;
        let event = db.create_event(event_fields("Golf")).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        uow.insert_participation(user.id, event.id).await.unwrap();
        assert!(uow.insert_participation(user.id, event.id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_event_cascades() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;
        let parent = db.create_event(event_fields("Futsal club")).await.unwrap();
        let child = db
            .create_event(EventFields {
                event_type: "practice".to_string(),
                parent_event_id: Some(parent.id),
                ..event_fields("Futsal practice")
            })
            .await
            .unwrap();

        let mut uow = Box::new(db.begin().await.unwrap());
        uow.insert_participation(user.id, parent.id).await.unwrap();
        uow.commit().await.unwrap();

        assert!(db.delete_event(parent.id).await.unwrap());
        assert!(!db.delete_event(parent.id).await.unwrap());
        assert!(db
            .list_participations_for_user(user.id)
            .await
            .unwrap()
            .is_empty());
        let child = db.get_event(child.id).await.unwrap().unwrap();
        assert_eq!(child.parent_event_id, None);
    }

    #[tokio::test]
    async fn test_delete_reward_cascades_requests() {
        let db = InMemoryDatabase::new();
        let user = seed_user(&db, "100").await;
        let reward = db
            .create_reward(CreateRewardRow {
                name: "Mug".to_string(),
                required_stamps: 3,
            })
            .await
            .unwrap();

        let mut uow = Box::new(db.begin().await.unwrap());
        uow.insert_reward_request(user.id, reward.id).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(db.list_pending_reward_requests().await.unwrap().len(), 1);

        assert!(db.delete_reward(reward.id).await.unwrap());
        assert!(db.list_pending_reward_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_events_undated_last() {
        let db = InMemoryDatabase::new();
        db.create_event(event_fields("Undated")).await.unwrap();
        db.create_event(EventFields {
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
            ..event_fields("May")
        })
        .await
        .unwrap();
        db.create_event(EventFields {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
            ..event_fields("March")
        })
        .await
        .unwrap();

        let titles: Vec<String> = db
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["March", "May", "Undated"]);
    }

    #[tokio::test]
    async fn test_pending_filter() {
        let db = InMemoryDatabase::new();
        let alice = seed_user(&db, "1").await;
        let bob = seed_user(&db, "2").await;
        let event = db.create_event(event_fields("Seminar")).await.unwrap();

        let mut uow = Box::new(db.begin().await.unwrap());
        uow.insert_participation(alice.id, event.id).await.unwrap();
        uow.insert_participation(bob.id, event.id).await.unwrap();
        uow.commit().await.unwrap();

        let all = db
            .list_pending_participations(PendingParticipationFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let only_bob = db
            .list_pending_participations(PendingParticipationFilter {
                user_id: Some(bob.id),
                event_id: None,
            })
            .await
            .unwrap();
        assert_eq!(only_bob.len(), 1);
        assert_eq!(only_bob[0].employee_code, "2");
        assert_eq!(only_bob[0].event_title, "Seminar");
    }
}
