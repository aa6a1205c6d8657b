// Users API routes
// Decision: /v1/me is the personal dashboard; /v1/users is the admin member list

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stamprally_core::{Dashboard, StampHistoryEntry, User};
use std::sync::Arc;
use utoipa::IntoParams;

use super::common::{ApiError, ErrorResponse, ListResponse};
use crate::auth::middleware::{AuthState, AuthUser, FromRef};
use crate::services::{DirectoryService, LedgerService};
use crate::storage::StorageBackend;

/// Default and maximum number of history entries returned
const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 200;

/// Query parameters for stamp history
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Number of entries, newest first (default 20)
    pub limit: Option<i64>,
}

/// App state for users routes
#[derive(Clone)]
pub struct UsersState {
    pub directory: Arc<DirectoryService>,
    pub ledger: Arc<LedgerService>,
    pub auth: AuthState,
}

impl UsersState {
    pub fn new(db: StorageBackend, auth: AuthState) -> Self {
        Self {
            directory: Arc::new(DirectoryService::new(db.clone())),
            ledger: Arc::new(LedgerService::new(db)),
            auth,
        }
    }
}

impl FromRef<UsersState> for AuthState {
    fn from_ref(input: &UsersState) -> Self {
        input.auth.clone()
    }
}

/// Create users routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/v1/me", get(get_dashboard))
        .route("/v1/me/history", get(get_history))
        .route("/v1/users", get(list_users))
        .with_state(state)
}

/// GET /v1/me - Personal dashboard
#[utoipa::path(
    get,
    path = "/v1/me",
    responses(
        (status = 200, description = "Balance, events, and recent history", body = Dashboard),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn get_dashboard(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> Result<Json<Dashboard>, ApiError> {
    Ok(Json(state.directory.dashboard(&auth.actor()).await?))
}

/// GET /v1/me/history - Caller's stamp history
#[utoipa::path(
    get,
    path = "/v1/me/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History entries, newest first", body = ListResponse<StampHistoryEntry>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn get_history(
    State(state): State<UsersState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ListResponse<StampHistoryEntry>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let history = state.ledger.history(auth.id, limit).await?;
    Ok(Json(ListResponse::new(history)))
}

/// GET /v1/users - List all users (admin)
#[utoipa::path(
    get,
    path = "/v1/users",
    responses(
        (status = 200, description = "Users by employee code", body = ListResponse<User>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> Result<Json<ListResponse<User>>, ApiError> {
    Ok(Json(ListResponse::new(
        state.directory.list_users(&auth.actor()).await?,
    )))
}
