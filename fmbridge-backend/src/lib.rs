//! # fmbridge-backend
//!
//! Backend implementations for fmbridge.
//!
//! - [`HostBackend`]: the production bridge; the embedding host registers
//!   async handlers for each capability operation.
//! - [`ScriptedBackend`]: a substitute capability for tests and examples.

pub mod host;
pub mod scripted;

// Re-exports
pub use host::{HostBackend, HostBackendBuilder};
pub use scripted::{ScriptedBackend, ScriptedReply};
