// Stamp Rally Control Plane Library
// Decision: Shared library for binaries (API server, OpenAPI export) and integration tests

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Router assembly
pub mod app;

// Authentication module
pub mod auth;

// Environment configuration
pub mod config;

// OpenAPI spec generation
pub mod openapi;

// Demo data
pub mod seed;

// Services layer
pub mod services;
pub use services::{
    DirectoryService, EventCatalogService, LedgerService, ParticipationService, RewardService,
};

// Storage layer
pub mod storage;

pub use app::build_app;
pub use config::AppConfig;
