// Authentication for the portal
// Decision: Identity comes from a bearer JWT; authorization is enforced in services

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use config::{AuthConfig, JwtConfig};
pub use jwt::JwtService;
pub use middleware::{AuthError, AuthState, AuthUser, FromRef};
pub use routes::routes;
