// HTTP application assembly
// Decision: Router construction lives in the library so integration tests drive
// the same router the server binary serves
// Decision: /health and Swagger UI are never prefixed; API routes honour API_PREFIX

use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::auth::{self, AuthState};
use crate::config::AppConfig;
use crate::openapi::ApiDoc;
use crate::storage::StorageBackend;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

/// Build the complete application router for the given storage backend.
pub fn build_app(db: StorageBackend, config: &AppConfig) -> Router {
    let auth_state = AuthState::new(config.auth.clone(), db.clone());
    let health_state = HealthState {
        storage: if db.is_dev_mode() {
            "in-memory"
        } else {
            "postgres"
        },
    };

    let api_routes = Router::new()
        .merge(auth::routes(auth_state.clone()))
        .merge(api::users::routes(api::users::UsersState::new(
            db.clone(),
            auth_state.clone(),
        )))
        .merge(api::events::routes(api::events::EventsState::new(
            db.clone(),
            auth_state.clone(),
        )))
        .merge(api::participations::routes(
            api::participations::ParticipationsState::new(db.clone(), auth_state.clone()),
        ))
        .merge(api::stamps::routes(api::stamps::StampsState::new(
            db.clone(),
            auth_state.clone(),
        )))
        .merge(api::rewards::routes(api::rewards::RewardsState::new(
            db, auth_state,
        )));

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let app = match cors_layer(&config.cors_allowed_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}

/// Build router with optional API prefix
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

/// CORS layer for the configured origins, or `None` for same-origin only.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        return None;
    }
    tracing::info!(origins = ?origins, "CORS origins configured");

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                header::ORIGIN,
            ])
            .allow_credentials(true),
    )
}
