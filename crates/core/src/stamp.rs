// Stamp ledger types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// One immutable line of a user's stamp history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StampHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Signed change: positive credit, negative debit, zero for a recorded decision.
    pub change: i32,
    #[cfg_attr(feature = "openapi", schema(example = "Golf cup: participation approved"))]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Cached balance next to the sum of the history it caches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LedgerBalance {
    pub user_id: Uuid,
    pub cached: i32,
    pub history_sum: i64,
}

impl LedgerBalance {
    pub fn is_consistent(&self) -> bool {
        i64::from(self.cached) == self.history_sum
    }
}
