// Authentication HTTP routes
// Decision: Use /v1/auth/* prefix for all auth endpoints (consistent with other API routes)
// Decision: Login returns a bearer token plus the user it belongs to

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use stamprally_core::User;
use utoipa::ToSchema;

use super::middleware::{AuthError, AuthState};
use crate::services::DirectoryService;

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "1")]
    pub employee_code: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/v1/auth/login", post(login))
        .with_state(state)
}

/// Login with employee code and password
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let user = DirectoryService::new(state.db.clone())
        .authenticate(&req.employee_code, &req.password)
        .await
        .map_err(|e| {
            tracing::error!("Database error during login: {}", e);
            AuthError::unauthorized("Login failed")
        })?
        .ok_or_else(|| AuthError::unauthorized("Invalid employee code or password"))?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(|e| {
            tracing::error!("Failed to generate access token: {}", e);
            AuthError::unauthorized("Login failed")
        })?;

    tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.expires_in(),
        user,
    }))
}
