//! # fmbridge-core
//!
//! Core abstractions and session runtime for bridging Apple's on-device
//! Foundation Models into Rust applications.
//!
//! This crate provides the capability trait the platform backend
//! implements, the structured-output request/response protocol (schema
//! rendering, prompt composition, reply normalization with graceful
//! fallback), and the `ModelSession` entry point that orchestrates the
//! dynamic-schema, fixed-schema, and streaming request paths.

pub mod capability;
pub mod error;
pub mod layer;
pub mod normalize;
pub mod prompt;
pub mod runtime;
pub mod schema;
pub mod types;

// Re-exports
pub use capability::ModelBackend;
pub use error::FmError;
pub use layer::{Layer, LayeredBackend};
pub use normalize::normalize_reply;
pub use prompt::compose_prompt;
pub use runtime::ModelSession;
pub use schema::{render_schema, FieldKind, FieldSchema};
pub use types::*;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, FmError>;
