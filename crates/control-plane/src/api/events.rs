// Event catalog HTTP routes
// Decision: Numeric fields accept numbers or strings, as admin forms send them

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use stamprally_core::{Event, EventDetail, EventSummary, NumericInput, Participation};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse};
use crate::auth::middleware::{AuthState, AuthUser, FromRef};
use crate::services::{EventCatalogService, ParticipationService};
use crate::storage::StorageBackend;

/// Request to create an event
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Display title. Required.
    #[schema(example = "Health seminar: sleep")]
    pub title: String,
    pub description: Option<String>,
    /// Date as `YYYY-MM-DD`. Empty means no date.
    #[schema(example = "2025-11-08")]
    pub date: Option<String>,
    pub location: Option<String>,
    /// Time of day as `HH:MM`.
    #[schema(example = "18:30")]
    pub start_time: Option<String>,
    #[schema(example = "20:00")]
    pub end_time: Option<String>,
    /// Advertised capacity. Unparsable values mean no capacity.
    #[schema(value_type = Option<i32>, example = 30)]
    pub capacity: Option<NumericInput>,
    pub contact_name: Option<String>,
    pub notes: Option<String>,
    /// One of `single`, `annual`, `practice`, `survey`. Defaults to `single`.
    #[schema(example = "single")]
    pub event_type: Option<String>,
    /// Stamps awarded on approval. Unparsable values mean 1.
    #[schema(value_type = Option<i32>, example = 1)]
    pub points: Option<NumericInput>,
    /// Annual event this practice session belongs to. Ignored for other types.
    pub parent_event_id: Option<String>,
}

/// Request to update an event. Absent fields are kept; empty strings clear
/// optional text fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    /// New title. Blank keeps the current title.
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Unparsable values keep the current capacity.
    #[schema(value_type = Option<i32>)]
    pub capacity: Option<NumericInput>,
    pub contact_name: Option<String>,
    pub notes: Option<String>,
    pub event_type: Option<String>,
    /// Unparsable values keep the current points.
    #[schema(value_type = Option<i32>)]
    pub points: Option<NumericInput>,
    /// Empty string detaches the event from its parent.
    pub parent_event_id: Option<String>,
}

/// App state for event routes
#[derive(Clone)]
pub struct EventsState {
    pub catalog: Arc<EventCatalogService>,
    pub participations: Arc<ParticipationService>,
    pub auth: AuthState,
}

impl EventsState {
    pub fn new(db: StorageBackend, auth: AuthState) -> Self {
        Self {
            catalog: Arc::new(EventCatalogService::new(db.clone())),
            participations: Arc::new(ParticipationService::new(db)),
            auth,
        }
    }
}

impl FromRef<EventsState> for AuthState {
    fn from_ref(input: &EventsState) -> Self {
        input.auth.clone()
    }
}

/// Create event routes
pub fn routes(state: EventsState) -> Router {
    Router::new()
        .route("/v1/events", get(list_events).post(create_event))
        .route(
            "/v1/events/:event_id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/v1/events/:event_id/join", post(join_event))
        .route("/v1/events/:event_id/toggle", post(toggle_event))
        .with_state(state)
}

/// GET /v1/events - List events with the caller's join state
#[utoipa::path(
    get,
    path = "/v1/events",
    responses(
        (status = 200, description = "Events ordered by date", body = ListResponse<EventSummary>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<EventsState>,
    auth: AuthUser,
) -> Result<Json<ListResponse<EventSummary>>, ApiError> {
    let events = state.catalog.list(&auth.actor()).await?;
    Ok(Json(ListResponse::new(events)))
}

/// POST /v1/events - Create an event (admin)
#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.catalog.create(&auth.actor(), req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /v1/events/{event_id} - Event with participants
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventDetail),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<EventsState>,
    _auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventDetail>, ApiError> {
    Ok(Json(state.catalog.detail(event_id).await?))
}

/// PATCH /v1/events/{event_id} - Update an event (admin)
#[utoipa::path(
    patch,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.catalog.update(&auth.actor(), event_id, req).await?))
}

/// DELETE /v1/events/{event_id} - Delete an event and its participations (admin)
#[utoipa::path(
    delete,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&auth.actor(), event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/events/{event_id}/toggle - Open or close an event (admin)
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/toggle",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event toggled", body = Event),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn toggle_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.catalog.toggle(&auth.actor(), event_id).await?))
}

/// POST /v1/events/{event_id}/join - Request to participate
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/join",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 201, description = "Participation pending approval", body = Participation),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event closed or already joined", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn join_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Participation>), ApiError> {
    let participation = state.participations.join(&auth.actor(), event_id).await?;
    Ok((StatusCode::CREATED, Json(participation)))
}
