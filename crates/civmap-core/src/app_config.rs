use std::path::PathBuf;
use std::time::Duration;

use crate::location::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Viewport defaults shared by the map layer and the selection synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDefaults {
    /// Initial map center (Trang province).
    pub center: Coordinates,
    pub initial_zoom: u8,
    /// Zoom used when a location is selected.
    pub focus_zoom: u8,
    pub fly_duration: Duration,
    pub ease_linearity: f64,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            center: Coordinates::new(7.5611, 99.6111),
            initial_zoom: 11,
            focus_zoom: 18,
            fly_duration: Duration::from_millis(1500),
            ease_linearity: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    /// Endpoint paths appended to `api_base_url`, tried in order.
    pub relay_endpoints: Vec<String>,
    pub relay_timeout_secs: u64,
    pub client_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub layers_path: Option<PathBuf>,
    pub map: MapDefaults,
}
