//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → targets → client → monitor, runner, context, SDK → Harness
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop API → stop monitor → persist context → exit
//!
//! Signals (signals.rs):
//!     SIGINT/Ctrl+C → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The transport is injected so tests can build a harness without sockets

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Harness;
