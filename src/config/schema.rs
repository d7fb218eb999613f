//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harness.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::operations::routes::{PathStyle, RouteOverride};

/// Root configuration for the test harness.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Control API listener.
    pub listener: ListenerConfig,

    /// Backend targets probed and exercised by the harness.
    pub targets: Vec<TargetConfig>,

    /// Health polling settings.
    pub health_check: HealthCheckConfig,

    /// Operation request settings.
    pub requests: RequestConfig,

    /// Context blob persistence.
    pub context: ContextConfig,

    /// Result log settings.
    pub results: ResultsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            targets: vec![
                TargetConfig {
                    name: "python".to_string(),
                    base_url: "http://localhost:8090".to_string(),
                    path_style: PathStyle::Api,
                    routes: Vec::new(),
                },
                TargetConfig {
                    name: "node".to_string(),
                    base_url: "http://localhost:8091".to_string(),
                    path_style: PathStyle::Bare,
                    routes: Vec::new(),
                },
            ],
            health_check: HealthCheckConfig::default(),
            requests: RequestConfig::default(),
            context: ContextConfig::default(),
            results: ResultsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8070").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8070".to_string(),
        }
    }
}

/// A named backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Unique target identifier (e.g., "python").
    pub name: String,

    /// Base URL of the service (e.g., "http://localhost:8090").
    pub base_url: String,

    /// Which user-record path layout the service uses.
    #[serde(default)]
    pub path_style: PathStyle,

    /// Per-operation route overrides applied on top of the path style.
    #[serde(default)]
    pub routes: Vec<RouteOverride>,
}

/// Health polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable background health polling.
    pub enabled: bool,

    /// Poll interval in milliseconds.
    pub interval_ms: u64,

    /// Probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Path to probe on every target.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5_000,
            timeout_ms: 15_000,
            path: "/health".to_string(),
        }
    }
}

/// Timeout applied to on-demand backend operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 15_000 }
    }
}

/// Where the user/application context blobs live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextConfig {
    /// JSON file holding `user_context` and `app_context`.
    pub store_path: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            store_path: "harness_context.json".to_string(),
        }
    }
}

/// Result log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Maximum number of entries kept; the oldest are evicted first.
    pub capacity: usize,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
