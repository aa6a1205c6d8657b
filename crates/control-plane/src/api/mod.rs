// HTTP API routes
//
// This module contains all HTTP route handlers for the public API.
// Each submodule handles a specific resource type with its own state.

pub mod common;
pub mod events;
pub mod participations;
pub mod rewards;
pub mod stamps;
pub mod users;

// Re-export common types
pub use common::{ApiError, ErrorResponse, ListResponse};
