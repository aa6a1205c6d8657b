// Reward and reward request HTTP routes
// Decision: Requests debit stamps immediately; approve/reject only track fulfilment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use stamprally_core::{NumericInput, Reward, RewardRequest};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse};
use crate::auth::middleware::{AuthState, AuthUser, FromRef};
use crate::services::RewardService;
use crate::storage::StorageBackend;

/// Request to create a reward
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRewardRequest {
    #[schema(example = "Cafe drink voucher")]
    pub name: String,
    /// Positive number of stamps, as a number or string.
    #[schema(value_type = i32, example = 3)]
    pub required_stamps: Option<NumericInput>,
}

/// App state for reward routes
#[derive(Clone)]
pub struct RewardsState {
    pub service: Arc<RewardService>,
    pub auth: AuthState,
}

impl RewardsState {
    pub fn new(db: StorageBackend, auth: AuthState) -> Self {
        Self {
            service: Arc::new(RewardService::new(db)),
            auth,
        }
    }
}

impl FromRef<RewardsState> for AuthState {
    fn from_ref(input: &RewardsState) -> Self {
        input.auth.clone()
    }
}

/// Create reward routes
pub fn routes(state: RewardsState) -> Router {
    Router::new()
        .route("/v1/rewards", get(list_rewards).post(create_reward))
        .route("/v1/rewards/:reward_id", delete(delete_reward))
        .route("/v1/rewards/:reward_id/request", post(request_reward))
        .route("/v1/reward-requests/mine", get(list_my_requests))
        .route("/v1/reward-requests/pending", get(list_pending_requests))
        .route("/v1/reward-requests/:request_id/approve", post(approve_request))
        .route("/v1/reward-requests/:request_id/reject", post(reject_request))
        .with_state(state)
}

/// GET /v1/rewards - Rewards ordered by required stamps
#[utoipa::path(
    get,
    path = "/v1/rewards",
    responses(
        (status = 200, description = "List of rewards", body = ListResponse<Reward>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rewards"
)]
pub async fn list_rewards(
    State(state): State<RewardsState>,
    _auth: AuthUser,
) -> Result<Json<ListResponse<Reward>>, ApiError> {
    Ok(Json(ListResponse::new(state.service.list().await?)))
}

/// POST /v1/rewards - Create a reward (admin)
#[utoipa::path(
    post,
    path = "/v1/rewards",
    request_body = CreateRewardRequest,
    responses(
        (status = 201, description = "Reward created", body = Reward),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "rewards"
)]
pub async fn create_reward(
    State(state): State<RewardsState>,
    auth: AuthUser,
    Json(req): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<Reward>), ApiError> {
    let reward = state
        .service
        .create(&auth.actor(), &req.name, req.required_stamps.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(reward)))
}

/// DELETE /v1/rewards/{reward_id} - Delete a reward and its requests (admin)
#[utoipa::path(
    delete,
    path = "/v1/rewards/{reward_id}",
    params(
        ("reward_id" = Uuid, Path, description = "Reward ID")
    ),
    responses(
        (status = 204, description = "Reward deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Reward not found", body = ErrorResponse)
    ),
    tag = "rewards"
)]
pub async fn delete_reward(
    State(state): State<RewardsState>,
    auth: AuthUser,
    Path(reward_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(&auth.actor(), reward_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/rewards/{reward_id}/request - Spend stamps on a reward
#[utoipa::path(
    post,
    path = "/v1/rewards/{reward_id}/request",
    params(
        ("reward_id" = Uuid, Path, description = "Reward ID")
    ),
    responses(
        (status = 201, description = "Stamps debited, request pending", body = RewardRequest),
        (status = 404, description = "Reward not found", body = ErrorResponse),
        (status = 409, description = "Insufficient stamps", body = ErrorResponse)
    ),
    tag = "rewards"
)]
pub async fn request_reward(
    State(state): State<RewardsState>,
    auth: AuthUser,
    Path(reward_id): Path<Uuid>,
) -> Result<(StatusCode, Json<RewardRequest>), ApiError> {
    let request = state.service.request(&auth.actor(), reward_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/reward-requests/mine - Caller's latest requests
#[utoipa::path(
    get,
    path = "/v1/reward-requests/mine",
    responses(
        (status = 200, description = "Latest requests, newest first", body = ListResponse<RewardRequest>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reward-requests"
)]
pub async fn list_my_requests(
    State(state): State<RewardsState>,
    auth: AuthUser,
) -> Result<Json<ListResponse<RewardRequest>>, ApiError> {
    Ok(Json(ListResponse::new(
        state.service.list_mine(&auth.actor()).await?,
    )))
}

/// GET /v1/reward-requests/pending - Requests awaiting fulfilment (admin)
#[utoipa::path(
    get,
    path = "/v1/reward-requests/pending",
    responses(
        (status = 200, description = "Pending requests, newest first", body = ListResponse<RewardRequest>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "reward-requests"
)]
pub async fn list_pending_requests(
    State(state): State<RewardsState>,
    auth: AuthUser,
) -> Result<Json<ListResponse<RewardRequest>>, ApiError> {
    Ok(Json(ListResponse::new(
        state.service.list_pending(&auth.actor()).await?,
    )))
}

/// POST /v1/reward-requests/{request_id}/approve - Mark as handed out (admin)
#[utoipa::path(
    post,
    path = "/v1/reward-requests/{request_id}/approve",
    params(
        ("request_id" = Uuid, Path, description = "Reward request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = RewardRequest),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "reward-requests"
)]
pub async fn approve_request(
    State(state): State<RewardsState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RewardRequest>, ApiError> {
    Ok(Json(
        state
            .service
            .approve_request(&auth.actor(), request_id)
            .await?,
    ))
}

/// POST /v1/reward-requests/{request_id}/reject - Decline, stamps stay spent (admin)
#[utoipa::path(
    post,
    path = "/v1/reward-requests/{request_id}/reject",
    params(
        ("request_id" = Uuid, Path, description = "Reward request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = RewardRequest),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "reward-requests"
)]
pub async fn reject_request(
    State(state): State<RewardsState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RewardRequest>, ApiError> {
    Ok(Json(
        state
            .service
            .reject_request(&auth.actor(), request_id)
            .await?,
    ))
}
