// Participation workflow: join, approve, reject
// Decision: A batch runs in one unit of work; ids that are missing or no
// longer pending are skipped, never an error
// Decision: Lock order is participations (sorted by id), then users (sorted by
// id), so concurrent batches cannot deadlock on each other

use chrono::Utc;
use stamprally_core::telemetry::span;
use stamprally_core::{
    decide_award, rejection_reason, Actor, ApprovalStatus, BatchOutcome, Entity, Event, EventType,
    Participation, PendingParticipation, PortalError, Precondition, Result,
};
use std::collections::BTreeSet;
use tracing::Instrument;
use uuid::Uuid;

use super::ledger::LedgerService;
use crate::storage::{ParticipationRow, PendingParticipationFilter, StorageBackend, UnitOfWork};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

pub struct ParticipationService {
    db: StorageBackend,
}

impl ParticipationService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Record a pending participation for the actor. The ledger is untouched.
    pub async fn join(&self, actor: &Actor, event_id: Uuid) -> Result<Participation> {
        let span = tracing::info_span!(span::JOIN_EVENT, user_id = %actor.user_id, %event_id);
        self.join_inner(actor, event_id).instrument(span).await
    }

    async fn join_inner(&self, actor: &Actor, event_id: Uuid) -> Result<Participation> {
        let mut uow = self.db.begin().await?;
        uow.lock_user(actor.user_id)
            .await?
            .ok_or(PortalError::NotFound(Entity::User))?;

        let event = uow
            .get_event(event_id)
            .await?
            .ok_or(PortalError::NotFound(Entity::Event))?;
        if !event.is_active {
            return Err(Precondition::EventInactive.into());
        }
        if uow
            .find_participation(actor.user_id, event_id)
            .await?
            .is_some()
        {
            return Err(Precondition::AlreadyJoined.into());
        }

        let row = uow.insert_participation(actor.user_id, event_id).await?;
        uow.commit().await?;

        tracing::info!(participation_id = %row.id, "participation requested");
        Ok(row.into())
    }

    /// Approve pending participations and award stamps per event type.
    pub async fn approve(&self, actor: &Actor, ids: &[Uuid]) -> Result<BatchOutcome> {
        actor.require_admin()?;
        let span = tracing::info_span!(
            span::APPROVE_BATCH,
            admin_id = %actor.user_id,
            requested = ids.len(),
            processed = tracing::field::Empty,
        );
        self.settle(ids, Decision::Approve).instrument(span).await
    }

    /// Reject pending participations. Each rejection leaves a zero ledger entry.
    pub async fn reject(&self, actor: &Actor, ids: &[Uuid]) -> Result<BatchOutcome> {
        actor.require_admin()?;
        let span = tracing::info_span!(
            span::REJECT_BATCH,
            admin_id = %actor.user_id,
            requested = ids.len(),
            processed = tracing::field::Empty,
        );
        self.settle(ids, Decision::Reject).instrument(span).await
    }

    async fn settle(&self, ids: &[Uuid], decision: Decision) -> Result<BatchOutcome> {
        let ids: BTreeSet<Uuid> = ids.iter().copied().collect();
        let mut outcome = BatchOutcome::default();
        let mut uow = self.db.begin().await?;

        let mut pending: Vec<ParticipationRow> = Vec::with_capacity(ids.len());
        for id in ids {
            match uow.lock_participation(id).await? {
                Some(row) if ApprovalStatus::from(row.approval_status.as_str()).is_pending() => {
                    pending.push(row)
                }
                _ => outcome.skipped.push(id),
            }
        }

        let users: BTreeSet<Uuid> = pending.iter().map(|p| p.user_id).collect();
        for user_id in users {
            uow.lock_user(user_id).await?;
        }

        for participation in pending {
            let Some(event) = uow.get_event(participation.event_id).await? else {
                outcome.skipped.push(participation.id);
                continue;
            };
            let event = Event::from(event);

            match decision {
                Decision::Approve => {
                    Self::approve_one(uow.as_mut(), &participation, &event).await?
                }
                Decision::Reject => {
                    uow.update_participation_status(participation.id, "rejected", None)
                        .await?;
                    LedgerService::apply_change(
                        uow.as_mut(),
                        participation.user_id,
                        0,
                        &rejection_reason(&event.title),
                    )
                    .await?;
                }
            }
            outcome.processed.push(participation.id);
        }

        uow.commit().await?;

        tracing::Span::current().record("processed", outcome.processed_count());
        tracing::info!(
            processed = outcome.processed.len(),
            skipped = outcome.skipped.len(),
            ?decision,
            "participation batch settled"
        );
        Ok(outcome)
    }

    async fn approve_one(
        uow: &mut dyn UnitOfWork,
        participation: &ParticipationRow,
        event: &Event,
    ) -> Result<()> {
        let has_parent_participation = match (event.event_type, event.parent_event_id) {
            (EventType::Practice, Some(parent_id)) => uow
                .find_participation(participation.user_id, parent_id)
                .await?
                .is_some(),
            _ => false,
        };
        let award = decide_award(event, has_parent_participation);

        uow.update_participation_status(participation.id, "approved", Some(Utc::now()))
            .await?;
        LedgerService::credit(uow, participation.user_id, award.amount, &award.reason).await?;

        tracing::debug!(
            participation_id = %participation.id,
            kind = ?award.kind,
            amount = award.amount,
            "participation approved"
        );
        Ok(())
    }

    /// Admin queue, newest join first.
    pub async fn list_pending(
        &self,
        actor: &Actor,
        filter: PendingParticipationFilter,
    ) -> Result<Vec<PendingParticipation>> {
        actor.require_admin()?;
        let rows = self.db.list_pending_participations(filter).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{actor, admin, event_fields, seed_user};

    #[tokio::test]
    async fn test_join_then_join_again() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Golf cup", "single", 2))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());

        let participation = service.join(&actor(&user), event.id).await.unwrap();
        assert_eq!(participation.approval_status, ApprovalStatus::Pending);
        assert!(participation.approved_at.is_none());

        let err = service.join(&actor(&user), event.id).await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::PreconditionFailed(Precondition::AlreadyJoined)
        ));
        assert_eq!(db.list_participations_for_user(user.id).await.unwrap().len(), 1);
        assert!(db.list_stamp_history(user.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_inactive_or_missing_event() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Closed", "single", 1))
            .await
            .unwrap();
        db.toggle_event(event.id).await.unwrap();
        let service = ParticipationService::new(db.clone());

        let err = service.join(&actor(&user), event.id).await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::PreconditionFailed(Precondition::EventInactive)
        ));

        let err = service.join(&actor(&user), Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(Entity::Event)));
    }

    #[tokio::test]
    async fn test_approve_single_event_awards_points() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Golf cup", "single", 2))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        let p = service.join(&actor(&user), event.id).await.unwrap();

        let outcome = service.approve(&admin, &[p.id]).await.unwrap();
        assert_eq!(outcome.processed, vec![p.id]);

        let balance = LedgerService::new(db.clone()).verify(user.id).await.unwrap();
        assert_eq!(balance.cached, 2);
        assert!(balance.is_consistent());

        let history = db.list_stamp_history(user.id, 10).await.unwrap();
        assert_eq!(history[0].reason, "Golf cup: participation approved");

        let approved = db.list_participations_for_user(user.id).await.unwrap();
        assert_eq!(approved[0].approval_status, "approved");
        assert!(approved[0].approved_at.is_some());
    }

    #[tokio::test]
    async fn test_zero_points_fall_back_to_one() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Survey", "survey", 0))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        let p = service.join(&actor(&user), event.id).await.unwrap();

        service.approve(&admin, &[p.id]).await.unwrap();
        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 1);
    }

    #[tokio::test]
    async fn test_practice_eligibility() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let enrolled = seed_user(&db, "1").await;
        let outsider = seed_user(&db, "2").await;
        let club = db
            .create_event(event_fields("Futsal club", "annual", 1))
            .await
            .unwrap();
        let practice = db
            .create_event(crate::storage::EventFields {
                parent_event_id: Some(club.id),
                ..event_fields("Futsal week 1", "practice", 3)
            })
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());

        // Parent participation counts in any status, pending included
        service.join(&actor(&enrolled), club.id).await.unwrap();
        let a = service.join(&actor(&enrolled), practice.id).await.unwrap();
        let b = service.join(&actor(&outsider), practice.id).await.unwrap();

        let outcome = service.approve(&admin, &[a.id, b.id]).await.unwrap();
        assert_eq!(outcome.processed_count(), 2);

        assert_eq!(db.get_user(enrolled.id).await.unwrap().unwrap().stamps, 3);
        assert_eq!(db.get_user(outsider.id).await.unwrap().unwrap().stamps, 0);

        let history = db.list_stamp_history(outsider.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change, 0);
        assert_eq!(history[0].reason, "Futsal week 1: not eligible, no stamp");
    }

    #[tokio::test]
    async fn test_annual_approval_awards_nothing() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let club = db
            .create_event(event_fields("Marathon club", "annual", 4))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        let p = service.join(&actor(&user), club.id).await.unwrap();

        service.approve(&admin, &[p.id]).await.unwrap();

        let history = db.list_stamp_history(user.id, 10).await.unwrap();
        assert_eq!(history[0].change, 0);
        assert_eq!(
            history[0].reason,
            "Marathon club: annual enrolment approved, no stamp"
        );
    }

    #[tokio::test]
    async fn test_reapproval_is_skipped() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Seminar", "single", 1))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        let p = service.join(&actor(&user), event.id).await.unwrap();

        service.approve(&admin, &[p.id]).await.unwrap();
        let missing = Uuid::now_v7();
        let outcome = service.approve(&admin, &[p.id, missing]).await.unwrap();
        assert!(outcome.processed.is_empty());
        assert_eq!(outcome.skipped.len(), 2);

        let outcome = service.reject(&admin, &[p.id]).await.unwrap();
        assert_eq!(outcome.skipped, vec![p.id]);

        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 1);
        assert_eq!(db.list_stamp_history(user.id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reject_logs_zero_entry() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Seminar", "single", 2))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        let p = service.join(&actor(&user), event.id).await.unwrap();

        let outcome = service.reject(&admin, &[p.id]).await.unwrap();
        assert_eq!(outcome.processed, vec![p.id]);

        let rows = db.list_participations_for_user(user.id).await.unwrap();
        assert_eq!(rows[0].approval_status, "rejected");
        assert!(rows[0].approved_at.is_none());

        let history = db.list_stamp_history(user.id, 10).await.unwrap();
        assert_eq!(history[0].change, 0);
        assert_eq!(history[0].reason, "Seminar: rejected, no stamp");
    }

    #[tokio::test]
    async fn test_non_admin_cannot_settle() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let event = db
            .create_event(event_fields("Seminar", "single", 2))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        let p = service.join(&actor(&user), event.id).await.unwrap();

        let err = service.approve(&actor(&user), &[p.id]).await.unwrap_err();
        assert!(matches!(err, PortalError::PermissionDenied));
        let err = service
            .list_pending(&actor(&user), PendingParticipationFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::PermissionDenied));

        let rows = db.list_participations_for_user(user.id).await.unwrap();
        assert_eq!(rows[0].approval_status, "pending");
    }

    #[tokio::test]
    async fn test_pending_queue() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let golf = db
            .create_event(event_fields("Golf", "single", 2))
            .await
            .unwrap();
        let seminar = db
            .create_event(event_fields("Seminar", "single", 1))
            .await
            .unwrap();
        let service = ParticipationService::new(db.clone());
        service.join(&actor(&user), golf.id).await.unwrap();
        service.join(&actor(&user), seminar.id).await.unwrap();

        let all = service
            .list_pending(&admin, PendingParticipationFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let golf_only = service
            .list_pending(
                &admin,
                PendingParticipationFilter {
                    user_id: None,
                    event_id: Some(golf.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(golf_only.len(), 1);
        assert_eq!(golf_only[0].event_title, "Golf");
        assert_eq!(golf_only[0].employee_code, "1");
    }
}
