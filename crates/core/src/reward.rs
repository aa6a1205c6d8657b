// Reward domain types
//
// Stamps are spent when a request is made. The request status only tracks
// whether the physical reward was handed out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Fulfilment state of a reward request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Waiting for fulfilment.
    #[default]
    Pending,
    /// Reward handed out.
    Approved,
    /// Request declined. Stamps are not refunded.
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<&str> for RequestStatus {
    fn from(s: &str) -> Self {
        match s {
            "approved" => RequestStatus::Approved,
            "rejected" => RequestStatus::Rejected,
            _ => RequestStatus::Pending,
        }
    }
}

/// Reward - something stamps can be exchanged for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Reward {
    pub id: Uuid,
    #[cfg_attr(feature = "openapi", schema(example = "Cafe drink voucher"))]
    pub name: String,
    /// Stamps debited per request.
    pub required_stamps: i32,
    pub created_at: DateTime<Utc>,
}

/// Reward request - a redemption made by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RewardRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}
