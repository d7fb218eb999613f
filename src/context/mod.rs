//! Context blob persistence.
//!
//! The SDK capability reads two JSON blobs, `user_context` and `app_context`.
//! They are seeded with defaults, edited through the control API, and kept in a
//! JSON file between runs.

pub mod store;

pub use store::{ContextError, ContextKey, ContextSnapshot, ContextStore};
