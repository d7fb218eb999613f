//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig (validated, immutable)
//!     → targets, monitor, runner and API built from it at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; targets are fixed for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ContextConfig;
pub use schema::HarnessConfig;
pub use schema::HealthCheckConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RequestConfig;
pub use schema::ResultsConfig;
pub use schema::TargetConfig;
