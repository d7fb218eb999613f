//! Backend operation subsystem.
//!
//! # Data Flow
//! ```text
//! User action (control API / CLI)
//!     → runner.rs (validate input, build request from the target's route table)
//!     → client::TimedRequestClient (15s deadline)
//!     → OperationResult (uniform success/failure record)
//!     → history.rs (running log shown to the user)
//! ```
//!
//! # Design Decisions
//! - Malformed input fails before any network call
//! - Error kind is preserved so callers can show a precise diagnostic
//! - No retries, no caching, no de-duplication of concurrent calls

pub mod history;
pub mod routes;
pub mod runner;

pub use history::{ResultEntry, ResultLog};
pub use routes::{Operation, PathStyle, Route, RouteTable};
pub use runner::{BackendOperationRunner, ErrorKind, OperationParams, OperationResult};

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
