// Server configuration loaded from environment variables
// Decision: No DATABASE_URL (or DEV_MODE=true) selects the in-memory backend
// Decision: Auth settings stay in auth::AuthConfig and are loaded alongside

use crate::auth::AuthConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string; `None` runs against in-memory storage
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Prefix for API routes, e.g. "/api" (health and Swagger UI are never prefixed)
    pub api_prefix: String,
    /// Origins allowed for cross-origin requests. Empty disables CORS.
    pub cors_allowed_origins: Vec<String>,
    /// Insert demo users, events and rewards on startup
    pub seed_demo_data: bool,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_prefix: String::new(),
            cors_allowed_origins: Vec::new(),
            seed_demo_data: false,
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `DATABASE_URL`: PostgreSQL URL
    /// - `DEV_MODE`: "true" or "1" forces in-memory storage
    /// - `BIND_ADDR`: listen address (default "0.0.0.0:9000")
    /// - `API_PREFIX`: route prefix (default empty)
    /// - `CORS_ALLOWED_ORIGINS`: comma-separated origins
    /// - `SEED_DEMO_DATA`: "true" or "1" seeds demo data (always on in dev mode)
    pub fn from_env() -> Self {
        let dev_mode = env_flag("DEV_MODE");
        let database_url = if dev_mode {
            None
        } else {
            std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty())
        };
        let seed_demo_data = env_flag("SEED_DEMO_DATA") || database_url.is_none();

        Self {
            database_url,
            bind_addr: std::env::var("BIND_ADDR")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_prefix: std::env::var("API_PREFIX").unwrap_or_default(),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or_default(),
            seed_demo_data,
            auth: AuthConfig::from_env(),
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.database_url.is_none()
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert!(config.api_prefix.is_empty());
        assert!(config.is_dev_mode());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example.com, https://b.example.com,,"),
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }
}
