//! Document-store SDK integration.
//!
//! # Data Flow
//! ```text
//! User action
//!     → operations.rs (input validation, result logging)
//!     → dyn SdkCapability (injected at startup)
//!         LocalSdk: context from ContextStore, documents in memory
//! ```
//!
//! # Design Decisions
//! - The SDK is an opaque capability; its failures surface verbatim
//! - The capability is injected, never loaded dynamically

pub mod capability;
pub mod local;
pub mod operations;
pub mod query;

pub use capability::{SdkCapability, SdkContext, SdkError};
pub use local::LocalSdk;
pub use operations::{SdkOperationError, SdkOperations};
