//! Outbound HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor probe / operation runner
//!     → timed.rs (arm deadline, await transport)
//!     → transport.rs (reqwest, or a stub in tests)
//!     → RequestOutcome (Success | Failure{timeout, network})
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline; no retries at this layer
//! - A non-2xx status is still a successful exchange here; callers interpret status
//! - Transport is a trait so the timing contract can be tested without sockets

pub mod timed;
pub mod transport;

#[cfg(test)]
pub(crate) mod stub;

pub use timed::{FailureKind, RequestFailure, RequestOutcome, TimedRequestClient};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
