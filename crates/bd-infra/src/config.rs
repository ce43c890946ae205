//! Environment-backed API configuration.

use serde::Deserialize;

/// Environment variable naming the API domain base URL.
pub const API_DOMAIN_ENV: &str = "BIZDESK_API_DOMAIN";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub base_url: String,
}

impl ApiConfig {
    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads the API domain from the environment (after loading `.env`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_var(std::env::var(API_DOMAIN_ENV).ok())
    }

    fn from_var(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Self {
                base_url: v.trim().trim_end_matches('/').to_string(),
            },
            _ => Self::defaults(),
        }
    }
}
