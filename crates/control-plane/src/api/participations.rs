// Participation approval HTTP routes (admin)
// Decision: Approve and reject take a batch of ids and report what was skipped

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use stamprally_core::{BatchOutcome, PendingParticipation};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse};
use crate::auth::middleware::{AuthState, AuthUser, FromRef};
use crate::services::ParticipationService;
use crate::storage::{PendingParticipationFilter, StorageBackend};

/// Query parameters for the pending queue
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PendingQuery {
    /// Only participations of this user
    pub user_id: Option<Uuid>,
    /// Only participations in this event
    pub event_id: Option<Uuid>,
}

/// Batch of participation ids to settle
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchRequest {
    pub ids: Vec<Uuid>,
}

/// App state for participation routes
#[derive(Clone)]
pub struct ParticipationsState {
    pub service: Arc<ParticipationService>,
    pub auth: AuthState,
}

impl ParticipationsState {
    pub fn new(db: StorageBackend, auth: AuthState) -> Self {
        Self {
            service: Arc::new(ParticipationService::new(db)),
            auth,
        }
    }
}

impl FromRef<ParticipationsState> for AuthState {
    fn from_ref(input: &ParticipationsState) -> Self {
        input.auth.clone()
    }
}

/// Create participation routes
pub fn routes(state: ParticipationsState) -> Router {
    Router::new()
        .route("/v1/participations/pending", get(list_pending))
        .route("/v1/participations/approve", post(approve))
        .route("/v1/participations/reject", post(reject))
        .with_state(state)
}

/// GET /v1/participations/pending - Pending queue, newest first
#[utoipa::path(
    get,
    path = "/v1/participations/pending",
    params(PendingQuery),
    responses(
        (status = 200, description = "Pending participations", body = ListResponse<PendingParticipation>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "participations"
)]
pub async fn list_pending(
    State(state): State<ParticipationsState>,
    auth: AuthUser,
    Query(query): Query<PendingQuery>,
) -> Result<Json<ListResponse<PendingParticipation>>, ApiError> {
    let filter = PendingParticipationFilter {
        user_id: query.user_id,
        event_id: query.event_id,
    };
    let pending = state.service.list_pending(&auth.actor(), filter).await?;
    Ok(Json(ListResponse::new(pending)))
}

/// POST /v1/participations/approve - Approve and award stamps
#[utoipa::path(
    post,
    path = "/v1/participations/approve",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Batch settled", body = BatchOutcome),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "participations"
)]
pub async fn approve(
    State(state): State<ParticipationsState>,
    auth: AuthUser,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(state.service.approve(&auth.actor(), &req.ids).await?))
}

/// POST /v1/participations/reject - Reject without stamps
#[utoipa::path(
    post,
    path = "/v1/participations/reject",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Batch settled", body = BatchOutcome),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "participations"
)]
pub async fn reject(
    State(state): State<ParticipationsState>,
    auth: AuthUser,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(state.service.reject(&auth.actor(), &req.ids).await?))
}
