//! Control API.
//!
//! # Responsibilities
//! - Expose backend liveness and on-demand operations over JSON
//! - Edit the context blobs and drive SDK operations
//! - List and clear the result log
//!
//! # Design Decisions
//! - Operation outcomes are returned as data (200 with `success: false`),
//!   HTTP errors are reserved for requests the API itself cannot route

pub mod handlers;
pub mod response;
pub mod server;

pub use server::HarnessServer;
