//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Ticker task (first tick immediate, then every interval)
//!     → one spawned probe per target, never awaiting siblings
//!     → GET <base_url>/health through the timed client
//!     → registry write, guarded by the monitor generation
//!
//! Registry (state.rs):
//!     Unknown → Online | Offline, last completed write wins
//! ```
//!
//! # Design Decisions
//! - One generic map from target name to state; no per-backend duplication
//! - Every failure kind collapses to Offline
//! - Overlapping ticks may race; completion order decides, not schedule order
//! - stop() bumps the generation so late probe completions are discarded

pub mod active;
pub mod state;

pub use active::HealthMonitor;
pub use state::{HealthRegistry, HealthState};
