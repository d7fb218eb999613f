//! Backend test harness library.
//!
//! Polls the liveness of named backend services, runs user-record operations
//! against them on demand, and drives an injected document-store SDK.

pub mod client;
pub mod config;
pub mod context;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod operations;
pub mod sdk;
pub mod target;

pub use client::{RequestOutcome, TimedRequestClient};
pub use config::schema::HarnessConfig;
pub use health::{HealthMonitor, HealthState};
pub use http::HarnessServer;
pub use lifecycle::{Harness, Shutdown};
pub use operations::{BackendOperationRunner, Operation, OperationResult};
pub use target::BackendTarget;
