//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Check target names are unique and base URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HarnessConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::HarnessConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target name must not be empty")]
    EmptyTargetName,

    #[error("duplicate target name '{0}'")]
    DuplicateTarget(String),

    #[error("target '{name}' has invalid base_url '{url}'")]
    InvalidBaseUrl { name: String, url: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for target in &config.targets {
        if target.name.trim().is_empty() {
            errors.push(ValidationError::EmptyTargetName);
        } else if !seen.insert(target.name.as_str()) {
            errors.push(ValidationError::DuplicateTarget(target.name.clone()));
        }

        let valid_url = Url::parse(&target.base_url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid_url {
            errors.push(ValidationError::InvalidBaseUrl {
                name: target.name.clone(),
                url: target.base_url.clone(),
            });
        }
    }

    if config.health_check.interval_ms == 0 {
        errors.push(ValidationError::Zero("health_check.interval_ms"));
    }
    if config.health_check.timeout_ms == 0 {
        errors.push(ValidationError::Zero("health_check.timeout_ms"));
    }
    if config.requests.timeout_ms == 0 {
        errors.push(ValidationError::Zero("requests.timeout_ms"));
    }
    if config.results.capacity == 0 {
        errors.push(ValidationError::Zero("results.capacity"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TargetConfig;
    use crate::operations::routes::PathStyle;

    fn target(name: &str, url: &str) -> TargetConfig {
        TargetConfig {
            name: name.to_string(),
            base_url: url.to_string(),
            path_style: PathStyle::Api,
            routes: Vec::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HarnessConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_targets() {
        let mut config = HarnessConfig::default();
        config.targets.push(target("python", "http://localhost:9999"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateTarget("python".into())]);
    }

    #[test]
    fn test_non_http_base_url() {
        let mut config = HarnessConfig::default();
        config.targets = vec![target("ftp", "ftp://example.com")];

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_zero_values() {
        let mut config = HarnessConfig::default();
        config.requests.timeout_ms = 0;
        config.results.capacity = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "requests.timeout_ms must be greater than zero");
    }
}
