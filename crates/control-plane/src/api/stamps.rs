// Stamp ledger HTTP routes (admin grants)

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use stamprally_core::{NumericInput, StampHistoryEntry};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse};
use crate::auth::middleware::{AuthState, AuthUser, FromRef};
use crate::services::LedgerService;
use crate::storage::StorageBackend;

/// Manual stamp grant
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrantRequest {
    pub user_id: Uuid,
    /// Signed amount; negative values take stamps away.
    #[schema(value_type = i32, example = 2)]
    pub amount: NumericInput,
    /// Defaults to "Special grant" when blank.
    pub reason: Option<String>,
}

/// Ledger entry written by a grant and the resulting balance
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GrantResponse {
    pub entry: StampHistoryEntry,
    pub balance: i32,
}

/// App state for stamp routes
#[derive(Clone)]
pub struct StampsState {
    pub ledger: Arc<LedgerService>,
    pub auth: AuthState,
}

impl StampsState {
    pub fn new(db: StorageBackend, auth: AuthState) -> Self {
        Self {
            ledger: Arc::new(LedgerService::new(db)),
            auth,
        }
    }
}

impl FromRef<StampsState> for AuthState {
    fn from_ref(input: &StampsState) -> Self {
        input.auth.clone()
    }
}

/// Create stamp routes
pub fn routes(state: StampsState) -> Router {
    Router::new()
        .route("/v1/stamps/grant", post(grant))
        .with_state(state)
}

/// POST /v1/stamps/grant - Grant or remove stamps manually (admin)
#[utoipa::path(
    post,
    path = "/v1/stamps/grant",
    request_body = GrantRequest,
    responses(
        (status = 200, description = "Stamps applied", body = GrantResponse),
        (status = 400, description = "Amount is not an integer", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "stamps"
)]
pub async fn grant(
    State(state): State<StampsState>,
    auth: AuthUser,
    Json(req): Json<GrantRequest>,
) -> Result<Json<GrantResponse>, ApiError> {
    let applied = state
        .ledger
        .grant(&auth.actor(), req.user_id, &req.amount, req.reason.as_deref())
        .await?;
    Ok(Json(GrantResponse {
        entry: applied.entry,
        balance: applied.balance,
    }))
}
