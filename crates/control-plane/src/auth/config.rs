// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Bearer access tokens only; no refresh tokens or cookies

use std::time::Duration;

/// Default access token lifetime: one working day.
const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(8 * 60 * 60);

const INSECURE_DEV_SECRET: &str = "insecure-dev-secret-change-me";

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: INSECURE_DEV_SECRET.to_string(),
            access_token_lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// - `AUTH_JWT_SECRET`: signing secret (insecure default with a warning)
    /// - `AUTH_ACCESS_TOKEN_LIFETIME_SECS`: token lifetime in seconds (default 8h)
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("AUTH_JWT_SECRET not set, using insecure default");
                INSECURE_DEV_SECRET.to_string()
            });

        let access_token_lifetime = std::env::var("AUTH_ACCESS_TOKEN_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME);

        Self {
            jwt: JwtConfig {
                secret,
                access_token_lifetime,
            },
        }
    }
}
