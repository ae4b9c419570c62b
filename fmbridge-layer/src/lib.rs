//! # fmbridge-layer
//!
//! Built-in layers for fmbridge.
//!
//! Currently implemented layers:
//! - `LoggingLayer`: Logs all backend operations with timing information
//! - `TimeoutLayer`: Per-call deadlines that synthesize timeout failures
//! - `ReadinessLayer`: Polls a still-initializing capability with backoff
//!   before dispatching
//!
//! ## Usage
//!
//! ```ignore
//! use fmbridge_core::ModelSession;
//! use fmbridge_layer::{LoggingLayer, ReadinessLayer, TimeoutLayer};
//!
//! let session = ModelSession::builder(backend)
//!     .layer(LoggingLayer::new())
//!     .layer(TimeoutLayer::new(std::time::Duration::from_secs(20)))
//!     .layer(ReadinessLayer::new().with_max_probes(4))
//!     .finish();
//! ```

pub mod logging;
pub mod readiness;
pub mod timeout;

// Re-exports
pub use logging::LoggingLayer;
pub use readiness::ReadinessLayer;
pub use timeout::TimeoutLayer;
