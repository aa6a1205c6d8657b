// Ledger service: the only writer of stamp balances
// Decision: A balance change is one history row plus one cached-balance update,
// always inside the caller's unit of work
// Decision: No sign check on the resulting balance; callers check preconditions

use stamprally_core::telemetry::span;
use stamprally_core::{
    Actor, Entity, LedgerBalance, NumericInput, PortalError, Result, StampHistoryEntry,
    DEFAULT_GRANT_REASON,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::storage::{CreateStampHistoryRow, StorageBackend, UnitOfWork};

/// A committed ledger change and the balance after it.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub entry: StampHistoryEntry,
    pub balance: i32,
}

pub struct LedgerService {
    db: StorageBackend,
}

impl LedgerService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Append a history entry and move the cached balance by `change`.
    pub async fn apply_change(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        change: i32,
        reason: &str,
    ) -> Result<AppliedChange> {
        let span = tracing::debug_span!(span::APPLY_CHANGE, %user_id, change);
        Self::apply_change_inner(uow, user_id, change, reason)
            .instrument(span)
            .await
    }

    async fn apply_change_inner(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        change: i32,
        reason: &str,
    ) -> Result<AppliedChange> {
        uow.lock_user(user_id)
            .await?
            .ok_or(PortalError::NotFound(Entity::User))?;

        let entry = uow
            .insert_stamp_history(CreateStampHistoryRow {
                user_id,
                change,
                reason: reason.to_string(),
            })
            .await?;
        let user = uow.add_user_stamps(user_id, change).await?;

        if change == 0 {
            tracing::debug!(%user_id, reason, "recorded zero-stamp entry");
        } else {
            tracing::info!(%user_id, change, balance = user.stamps, reason, "stamps applied");
        }

        Ok(AppliedChange {
            entry: entry.into(),
            balance: user.stamps,
        })
    }

    pub async fn credit(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<AppliedChange> {
        Self::apply_change(uow, user_id, amount, reason).await
    }

    pub async fn debit(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<AppliedChange> {
        Self::apply_change(uow, user_id, -amount, reason).await
    }

    /// Manual grant by an admin. `amount` may be negative; it must parse as an integer.
    pub async fn grant(
        &self,
        actor: &Actor,
        user_id: Uuid,
        amount: &NumericInput,
        reason: Option<&str>,
    ) -> Result<AppliedChange> {
        actor.require_admin()?;
        let amount = amount
            .parse()
            .ok_or_else(|| PortalError::invalid_input("amount must be an integer"))?;
        let reason = match reason.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => DEFAULT_GRANT_REASON,
        };

        let span = tracing::info_span!(span::GRANT, admin_id = %actor.user_id, %user_id, amount);
        self.grant_inner(user_id, amount, reason)
            .instrument(span)
            .await
    }

    async fn grant_inner(&self, user_id: Uuid, amount: i32, reason: &str) -> Result<AppliedChange> {
        let mut uow = self.db.begin().await?;
        let applied = Self::apply_change(uow.as_mut(), user_id, amount, reason).await?;
        uow.commit().await?;
        Ok(applied)
    }

    /// Newest entries first.
    pub async fn history(&self, user_id: Uuid, limit: i64) -> Result<Vec<StampHistoryEntry>> {
        let rows = self.db.list_stamp_history(user_id, limit).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Cached balance next to the sum of the user's history.
    pub async fn verify(&self, user_id: Uuid) -> Result<LedgerBalance> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or(PortalError::NotFound(Entity::User))?;
        let history_sum = self.db.sum_stamp_history(user_id).await?;
        let balance = LedgerBalance {
            user_id,
            cached: user.stamps,
            history_sum,
        };
        if !balance.is_consistent() {
            tracing::error!(%user_id, cached = balance.cached, history_sum, "ledger out of balance");
        }
        Ok(balance)
    }
}
