// OpenAPI specification generation
//
// This module defines the OpenAPI spec for the Stamp Rally API.
// It is used by both the API server (for Swagger UI)
// and the export-openapi binary (for static spec generation).

use crate::api;
use crate::api::{ErrorResponse, ListResponse};
use crate::auth::routes::{LoginRequest, TokenResponse};
use stamprally_core::{
    ApprovalStatus, BatchOutcome, Dashboard, Event, EventDetail, EventSummary, EventType,
    Participation, PendingParticipation, RecentEvent, RequestStatus, Reward, RewardRequest,
    StampHistoryEntry, User, UserRole,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the Stamp Rally API
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::routes::login,
        api::users::get_dashboard,
        api::users::get_history,
        api::users::list_users,
        api::events::list_events,
        api::events::create_event,
        api::events::get_event,
        api::events::update_event,
        api::events::delete_event,
        api::events::toggle_event,
        api::events::join_event,
        api::participations::list_pending,
        api::participations::approve,
        api::participations::reject,
        api::stamps::grant,
        api::rewards::list_rewards,
        api::rewards::create_reward,
        api::rewards::delete_reward,
        api::rewards::request_reward,
        api::rewards::list_my_requests,
        api::rewards::list_pending_requests,
        api::rewards::approve_request,
        api::rewards::reject_request,
    ),
    components(
        schemas(
            User, UserRole, Dashboard, RecentEvent, StampHistoryEntry,
            Event, EventType, EventSummary, EventDetail,
            Participation, ApprovalStatus, PendingParticipation, BatchOutcome,
            Reward, RewardRequest, RequestStatus,
            LoginRequest, TokenResponse, ErrorResponse,
            api::events::CreateEventRequest, api::events::UpdateEventRequest,
            api::participations::BatchRequest,
            api::stamps::GrantRequest, api::stamps::GrantResponse,
            api::rewards::CreateRewardRequest,
            ListResponse<User>,
            ListResponse<EventSummary>,
            ListResponse<PendingParticipation>,
            ListResponse<StampHistoryEntry>,
            ListResponse<Reward>,
            ListResponse<RewardRequest>,
        )
    ),
    tags(
        (name = "auth", description = "Login"),
        (name = "users", description = "Dashboard, stamp history, and member list"),
        (name = "events", description = "Event catalog and joining"),
        (name = "participations", description = "Participation approval queue"),
        (name = "stamps", description = "Manual stamp grants"),
        (name = "rewards", description = "Rewards and redemption"),
        (name = "reward-requests", description = "Reward request fulfilment")
    ),
    info(
        title = "Stamp Rally API",
        version = "0.1.0",
        description = "Employee engagement portal: join events, earn stamps, redeem rewards",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> serde_json::Result<String> {
        Self::openapi().to_pretty_json()
    }
}
