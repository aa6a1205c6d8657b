// Read models assembled from several entities
//
// These are what the portal shows a user: the event list with their own join
// state, one event with its participants, and the personal dashboard.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::event::Event;
use crate::stamp::StampHistoryEntry;
use crate::user::User;

/// Event as listed for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    /// Whether the caller has a participation (any status) in this event.
    pub joined: bool,
}

/// Event with everyone who joined it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventDetail {
    pub event: Event,
    /// Participants ordered by employee code.
    pub participants: Vec<User>,
    pub current_count: usize,
}

/// Recently joined event with its participant count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RecentEvent {
    #[serde(flatten)]
    pub event: Event,
    pub participant_count: usize,
}

/// Personal dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Dashboard {
    pub user: User,
    /// Last joined events, newest first.
    pub recent_events: Vec<RecentEvent>,
    /// Joined events still accepting participants.
    pub joined_active: Vec<Event>,
    /// Joined events that are closed.
    pub joined_finished: Vec<Event>,
    /// Closed events the user never joined.
    pub finished_not_joined: Vec<Event>,
    /// Latest stamp history, newest first.
    pub history: Vec<StampHistoryEntry>,
}

impl Dashboard {
    /// Number of recent events shown.
    pub const RECENT_EVENTS: usize = 5;
    /// Number of history entries shown.
    pub const HISTORY_ENTRIES: i64 = 20;

    /// Split events into the three dashboard groups by join state and `is_active`.
    /// Events keep their input order.
    pub fn group_events(
        events: Vec<Event>,
        joined: impl Fn(&Event) -> bool,
    ) -> (Vec<Event>, Vec<Event>, Vec<Event>) {
        let mut joined_active = Vec::new();
        let mut joined_finished = Vec::new();
        let mut finished_not_joined = Vec::new();
        for event in events {
            match (joined(&event), event.is_active) {
                (true, true) => joined_active.push(event),
                (true, false) => joined_finished.push(event),
                (false, false) => finished_not_joined.push(event),
                (false, true) => {}
            }
        }
        (joined_active, joined_finished, finished_not_joined)
    }
}
