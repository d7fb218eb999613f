//! Backend targets.

use serde::Serialize;

use crate::config::TargetConfig;
use crate::operations::routes::RouteTable;

/// A named backend service. Immutable once built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub name: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub routes: RouteTable,
}

impl BackendTarget {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, routes: RouteTable) -> Self {
        let base_url: String = base_url.into();
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            routes,
        }
    }

    /// Absolute URL for a path on this target.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn summary(&self) -> TargetSummary {
        TargetSummary {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl From<&TargetConfig> for BackendTarget {
    fn from(config: &TargetConfig) -> Self {
        let routes = config
            .routes
            .iter()
            .fold(RouteTable::for_style(config.path_style), |table, ov| {
                table.with_override(ov)
            });
        BackendTarget::new(config.name.clone(), config.base_url.clone(), routes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub name: String,
    pub base_url: String,
}
