// Reward redemption and reward administration
// Decision: Stamps are debited when the request is made; request status only
// tracks fulfilment and never touches the ledger
// Decision: The balance check and the debit share one unit of work that holds
// the user's lock, so concurrent requests cannot overdraw

use stamprally_core::telemetry::span;
use stamprally_core::{
    redemption_reason, Actor, Entity, NumericInput, PortalError, Precondition, RequestStatus,
    Result, Reward, RewardRequest,
};
use tracing::Instrument;
use uuid::Uuid;

use super::ledger::LedgerService;
use crate::storage::{CreateRewardRow, StorageBackend};

/// Requests shown in a user's own list.
pub const RECENT_REQUESTS: i64 = 10;

pub struct RewardService {
    db: StorageBackend,
}

impl RewardService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Ordered by required stamps, then name.
    pub async fn list(&self) -> Result<Vec<Reward>> {
        let rows = self.db.list_rewards().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create(
        &self,
        actor: &Actor,
        name: &str,
        required_stamps: Option<&NumericInput>,
    ) -> Result<Reward> {
        actor.require_admin()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PortalError::invalid_input("reward name is required"));
        }
        let required_stamps = required_stamps
            .and_then(NumericInput::parse)
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                PortalError::invalid_input("required_stamps must be a positive integer")
            })?;

        let row = self
            .db
            .create_reward(CreateRewardRow {
                name: name.to_string(),
                required_stamps,
            })
            .await?;
        tracing::info!(reward_id = %row.id, name, required_stamps, "reward created");
        Ok(row.into())
    }

    /// Delete a reward and its requests. Stamp history is kept.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        actor.require_admin()?;
        if !self.db.delete_reward(id).await? {
            return Err(PortalError::NotFound(Entity::Reward));
        }
        tracing::info!(reward_id = %id, "reward deleted");
        Ok(())
    }

    /// Spend stamps on a reward. Repeat requests are allowed, each checked on its own.
    pub async fn request(&self, actor: &Actor, reward_id: Uuid) -> Result<RewardRequest> {
        let span = tracing::info_span!(
            span::REQUEST_REWARD,
            user_id = %actor.user_id,
            %reward_id,
        );
        self.request_inner(actor, reward_id).instrument(span).await
    }

    async fn request_inner(&self, actor: &Actor, reward_id: Uuid) -> Result<RewardRequest> {
        let mut uow = self.db.begin().await?;
        let reward = uow
            .get_reward(reward_id)
            .await?
            .ok_or(PortalError::NotFound(Entity::Reward))?;
        let user = uow
            .lock_user(actor.user_id)
            .await?
            .ok_or(PortalError::NotFound(Entity::User))?;

        if user.stamps < reward.required_stamps {
            tracing::info!(
                required = reward.required_stamps,
                available = user.stamps,
                "reward request refused"
            );
            return Err(Precondition::InsufficientStamps {
                required: reward.required_stamps,
                available: user.stamps,
            }
            .into());
        }

        let request = uow.insert_reward_request(user.id, reward.id).await?;
        LedgerService::debit(
            uow.as_mut(),
            user.id,
            reward.required_stamps,
            &redemption_reason(&reward.name),
        )
        .await?;
        uow.commit().await?;

        tracing::info!(request_id = %request.id, "reward requested");
        Ok(request.into())
    }

    /// Mark a request as handed out.
    pub async fn approve_request(&self, actor: &Actor, id: Uuid) -> Result<RewardRequest> {
        self.set_status(actor, id, RequestStatus::Approved).await
    }

    /// Decline a request. Stamps stay debited.
    pub async fn reject_request(&self, actor: &Actor, id: Uuid) -> Result<RewardRequest> {
        self.set_status(actor, id, RequestStatus::Rejected).await
    }

    async fn set_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<RewardRequest> {
        actor.require_admin()?;
        let row = self
            .db
            .set_reward_request_status(id, &status.to_string())
            .await?
            .ok_or(PortalError::NotFound(Entity::RewardRequest))?;
        tracing::info!(request_id = %id, %status, "reward request updated");
        Ok(row.into())
    }

    /// The actor's latest requests, newest first.
    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<RewardRequest>> {
        let rows = self
            .db
            .list_reward_requests_for_user(actor.user_id, RECENT_REQUESTS)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Admin queue, newest first.
    pub async fn list_pending(&self, actor: &Actor) -> Result<Vec<RewardRequest>> {
        actor.require_admin()?;
        let rows = self.db.list_pending_reward_requests().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{actor, admin, seed_user};
    use std::sync::Arc;

    async fn reward(db: &StorageBackend, name: &str, required_stamps: i32) -> Reward {
        db.create_reward(CreateRewardRow {
            name: name.to_string(),
            required_stamps,
        })
        .await
        .unwrap()
        .into()
    }

    async fn credit(db: &StorageBackend, user_id: Uuid, amount: i32) {
        let mut uow = db.begin().await.unwrap();
        LedgerService::credit(uow.as_mut(), user_id, amount, "setup")
            .await
            .unwrap();
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_request_at_exact_balance() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let mug = reward(&db, "Mug", 3).await;
        credit(&db, user.id, 3).await;
        let service = RewardService::new(db.clone());

        let request = service.request(&actor(&user), mug.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let balance = LedgerService::new(db.clone()).verify(user.id).await.unwrap();
        assert_eq!(balance.cached, 0);
        assert!(balance.is_consistent());
        let history = db.list_stamp_history(user.id, 10).await.unwrap();
        assert_eq!(history[0].change, -3);
        assert_eq!(history[0].reason, "Reward request: Mug");

        let err = service.request(&actor(&user), mug.id).await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::PreconditionFailed(Precondition::InsufficientStamps {
                required: 3,
                available: 0
            })
        ));
        assert_eq!(service.list_mine(&actor(&user)).await.unwrap().len(), 1);
        assert_eq!(db.list_stamp_history(user.id, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_repeat_requests_each_debit() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let voucher = reward(&db, "Voucher", 2).await;
        credit(&db, user.id, 5).await;
        let service = RewardService::new(db.clone());

        service.request(&actor(&user), voucher.id).await.unwrap();
        service.request(&actor(&user), voucher.id).await.unwrap();

        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 1);
        assert_eq!(service.list_mine(&actor(&user)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_overdraw() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let towel = reward(&db, "Towel", 2).await;
        credit(&db, user.id, 5).await;
        let service = Arc::new(RewardService::new(db.clone()));
        let actor = actor(&user);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.request(&actor, towel.id).await })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                granted += 1;
            }
        }

        assert_eq!(granted, 2);
        let balance = LedgerService::new(db).verify(user.id).await.unwrap();
        assert_eq!(balance.cached, 1);
        assert!(balance.is_consistent());
    }

    #[tokio::test]
    async fn test_request_unknown_reward() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;

        let err = RewardService::new(db)
            .request(&actor(&user), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(Entity::Reward)));
    }

    #[tokio::test]
    async fn test_fulfilment_does_not_touch_ledger() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let mug = reward(&db, "Mug", 1).await;
        credit(&db, user.id, 2).await;
        let service = RewardService::new(db.clone());
        let request = service.request(&actor(&user), mug.id).await.unwrap();

        assert_eq!(service.list_pending(&admin).await.unwrap().len(), 1);
        let rejected = service.reject_request(&admin, request.id).await.unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert!(service.list_pending(&admin).await.unwrap().is_empty());

        assert_eq!(db.get_user(user.id).await.unwrap().unwrap().stamps, 1);

        let err = service
            .approve_request(&admin, Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(Entity::RewardRequest)));
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let service = RewardService::new(db);

        let created = service
            .create(&admin, " Drink voucher ", Some(&NumericInput::from("4")))
            .await
            .unwrap();
        assert_eq!(created.name, "Drink voucher");
        assert_eq!(created.required_stamps, 4);

        for bad in [None, Some(NumericInput::from("0")), Some(NumericInput::from("x"))] {
            let err = service
                .create(&admin, "Towel", bad.as_ref())
                .await
                .unwrap_err();
            assert!(matches!(err, PortalError::InvalidInput(_)));
        }

        let err = service
            .create(&admin, "  ", Some(&NumericInput::from(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_reward_keeps_history() {
        let db = StorageBackend::in_memory();
        let admin = admin(&db).await;
        let user = seed_user(&db, "1").await;
        let mug = reward(&db, "Mug", 1).await;
        credit(&db, user.id, 1).await;
        let service = RewardService::new(db.clone());
        service.request(&actor(&user), mug.id).await.unwrap();

        service.delete(&admin, mug.id).await.unwrap();
        assert!(service.list_mine(&actor(&user)).await.unwrap().is_empty());
        assert_eq!(db.list_stamp_history(user.id, 10).await.unwrap().len(), 2);

        let err = service.delete(&admin, mug.id).await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(Entity::Reward)));
    }

    #[tokio::test]
    async fn test_reward_admin_requires_admin() {
        let db = StorageBackend::in_memory();
        let user = seed_user(&db, "1").await;
        let mug = reward(&db, "Mug", 1).await;
        let service = RewardService::new(db.clone());

        let err = service.delete(&actor(&user), mug.id).await.unwrap_err();
        assert!(matches!(err, PortalError::PermissionDenied));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
