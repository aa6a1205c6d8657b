// Directory: who users are and what they see first
// Decision: Credentials are compared as stored; hashing is out of scope

use stamprally_core::{Actor, Dashboard, Entity, Event, PortalError, RecentEvent, Result, User};
use std::collections::HashSet;
use uuid::Uuid;

use crate::storage::StorageBackend;

pub struct DirectoryService {
    db: StorageBackend,
}

impl DirectoryService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Check credentials. `None` when the code is unknown or the password differs.
    pub async fn authenticate(&self, employee_code: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .db
            .get_user_by_employee_code(employee_code.trim())
            .await?;
        match user {
            Some(row) if row.password == password => Ok(Some(row.into())),
            Some(_) => {
                tracing::info!(employee_code, "login rejected: wrong password");
                Ok(None)
            }
            None => {
                tracing::info!(employee_code, "login rejected: unknown employee code");
                Ok(None)
            }
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.db
            .get_user(id)
            .await?
            .map(Into::into)
            .ok_or(PortalError::NotFound(Entity::User))
    }

    pub async fn dashboard(&self, actor: &Actor) -> Result<Dashboard> {
        let user = self.get_user(actor.user_id).await?;

        let participations = self.db.list_participations_for_user(actor.user_id).await?;
        let joined: HashSet<Uuid> = participations.iter().map(|p| p.event_id).collect();

        let mut recent_events = Vec::with_capacity(Dashboard::RECENT_EVENTS);
        for participation in participations.iter().take(Dashboard::RECENT_EVENTS) {
            let Some(event) = self.db.get_event(participation.event_id).await? else {
                continue;
            };
            let participant_count = self.db.list_event_participants(event.id).await?.len();
            recent_events.push(RecentEvent {
                event: event.into(),
                participant_count,
            });
        }

        let events: Vec<Event> = self
            .db
            .list_events()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let (joined_active, joined_finished, finished_not_joined) =
            Dashboard::group_events(events, |e| joined.contains(&e.id));

        let history = self
            .db
            .list_stamp_history(actor.user_id, Dashboard::HISTORY_ENTRIES)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(Dashboard {
            user,
            recent_events,
            joined_active,
            joined_finished,
            finished_not_joined,
            history,
        })
    }

    /// All users by employee code. Admin only.
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>> {
        actor.require_admin()?;
        let rows = self.db.list_users().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{actor, admin, event_fields, seed_user};
    use crate::services::ParticipationService;

    #[tokio::test]
    async fn test_authenticate() {
        let db = StorageBackend::in_memory();
        seed_user(&db, "1").await;
        let directory = DirectoryService::new(db);

        let user = directory.authenticate("1", "99").await.unwrap().unwrap();
        assert_eq!(user.employee_code, "1");
        assert!(directory.authenticate("1", "98").await.unwrap().is_none());
        assert!(directory.authenticate("404", "99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dashboard_groups() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let open = db
            .create_event(event_fields("Open joined", "single", 1))
            .await
            .unwrap();
        let closed = db
            .create_event(event_fields("Closed joined", "single", 2))
            .await
            .unwrap();
        let missed = db
            .create_event(event_fields("Missed", "single", 1))
            .await
            .unwrap();
        db.create_event(event_fields("Still open", "single", 1))
            .await
            .unwrap();

        let participations = ParticipationService::new(db.clone());
        participations.join(&actor(&user), open.id).await.unwrap();
        let p = participations.join(&actor(&user), closed.id).await.unwrap();
        participations.approve(&admin, &[p.id]).await.unwrap();
        db.toggle_event(closed.id).await.unwrap();
        db.toggle_event(missed.id).await.unwrap();

        let dashboard = DirectoryService::new(db)
            .dashboard(&actor(&user))
            .await
            .unwrap();

        assert_eq!(dashboard.user.stamps, 2);
        assert_eq!(dashboard.recent_events.len(), 2);
        assert_eq!(dashboard.recent_events[0].participant_count, 1);
        assert_eq!(dashboard.joined_active[0].id, open.id);
        assert_eq!(dashboard.joined_finished[0].id, closed.id);
        assert_eq!(dashboard.finished_not_joined.len(), 1);
        assert_eq!(dashboard.finished_not_joined[0].id, missed.id);
        assert_eq!(dashboard.history.len(), 1);
    }

    #[tokio::test]
    async fn test_list_users_requires_admin() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let directory = DirectoryService::new(db);

        assert_eq!(directory.list_users(&admin).await.unwrap().len(), 2);
        let err = directory.list_users(&actor(&user)).await.unwrap_err();
        assert!(matches!(err, PortalError::PermissionDenied));
    }
}
