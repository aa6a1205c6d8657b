// Event domain types
//
// Events are what employees join. Practice events hang off an annual event
// through `parent_event_id`; stamps for a practice session require enrolment
// in that parent.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PortalError, Result};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Award amount used when an event has no usable points value.
pub const DEFAULT_EVENT_POINTS: i32 = 1;

/// Kind of event.
/// - `single`: one-off event
/// - `annual`: year-long programme that practice sessions belong to
/// - `practice`: a session of an annual programme
/// - `survey`: questionnaire or open call for submissions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// One-off event.
    #[default]
    Single,
    /// Year-long programme.
    Annual,
    /// Session of an annual programme.
    Practice,
    /// Questionnaire or open call.
    Survey,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Single => write!(f, "single"),
            EventType::Annual => write!(f, "annual"),
            EventType::Practice => write!(f, "practice"),
            EventType::Survey => write!(f, "survey"),
        }
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "annual" => EventType::Annual,
            "practice" => EventType::Practice,
            "survey" => EventType::Survey,
            _ => EventType::Single,
        }
    }
}

/// Strict parse for admin input. `From<&str>` is for trusted storage values.
impl std::str::FromStr for EventType {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "single" => Ok(EventType::Single),
            "annual" => Ok(EventType::Annual),
            "practice" => Ok(EventType::Practice),
            "survey" => Ok(EventType::Survey),
            other => Err(PortalError::invalid_input(format!(
                "unknown event type: {other}"
            ))),
        }
    }
}

/// Event - something employees can join to earn stamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// Display title.
    #[cfg_attr(feature = "openapi", schema(example = "Health seminar: sleep"))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Calendar date the event takes place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    /// Advertised capacity. Informational, joins are not capped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub event_type: EventType,
    /// Stamps awarded when a participation is approved.
    pub points: i32,
    /// Whether the event accepts new participants.
    pub is_active: bool,
    /// Annual event this practice session belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Points to award, treating zero or negative values as the default.
    pub fn effective_points(&self) -> i32 {
        if self.points <= 0 {
            DEFAULT_EVENT_POINTS
        } else {
            self.points
        }
    }
}
