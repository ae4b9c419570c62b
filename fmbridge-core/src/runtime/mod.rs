//! Session runtime.
//!
//! This module provides the layer that sits between the high-level API
//! (generate_text, extract, generate_typed, stream_text) and the low-level
//! capability interface. It is responsible for:
//! - Gating dispatch on the capability's readiness state
//! - Rendering dynamic schemas and composing the final prompt
//! - Normalizing raw replies, degrading gracefully on parse failure
//! - Relaying fixed-schema results without text parsing
//! - Wrapping backend delta streams into ordered event streams

pub mod session;

pub use session::{ModelSession, ModelSessionBuilder};
