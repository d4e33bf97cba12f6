//! Configuration for the gantt-bridge service.

use std::env;

/// Service configuration, derived from environment variables.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Base URL of the host platform (Frappe/ERPNext).
    pub frappe_url: String,
    /// API key for host authentication.
    pub api_key: Option<String>,
    /// API secret paired with the key.
    pub api_secret: Option<String>,
    /// Allowed CORS origin for the widget page. Permissive when unset.
    pub allowed_origin: Option<String>,
    /// Settings cache time-to-live in seconds (default: 1 hour).
    pub settings_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("GANTT_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8084),
            frappe_url: env::var("FRAPPE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_key: env::var("FRAPPE_API_KEY").ok().filter(|s| !s.is_empty()),
            api_secret: env::var("FRAPPE_API_SECRET").ok().filter(|s| !s.is_empty()),
            allowed_origin: env::var("GANTT_ALLOWED_ORIGIN")
                .ok()
                .filter(|s| !s.is_empty()),
            settings_cache_ttl_secs: env::var("GANTT_SETTINGS_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
        }
    }
}
