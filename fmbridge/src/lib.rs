//! # fmbridge
//!
//! Rust bridge to Apple's on-device Foundation Models.
//!
//! fmbridge exposes the platform-supplied generative model as a typed,
//! composable Rust API. Its core is the structured-output protocol:
//! caller-supplied field schemas are rendered into prompt text, and the
//! model's raw reply is parsed back into structured data with graceful
//! fallback when parsing fails.
//!
//! ## Features
//!
//! - **Dynamic schemas**: flat field declarations steering free-text
//!   generation toward a parseable JSON object
//! - **Fixed schemas**: a closed vocabulary of natively-typed outputs
//!   (article analysis, contacts, classification, keywords)
//! - **Graceful degradation**: unparseable replies come back as usable
//!   raw text with a warning, never as a failure
//! - **Composable layers**: logging, deadlines, readiness polling
//! - **Async/await**: full async support with tokio, including ordered
//!   streaming with an explicit terminal notification
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! fmbridge = { version = "0.1", features = ["backends", "layers"] }
//! ```
//!
//! ```ignore
//! use fmbridge::{FieldKind, FieldSchema, GenerateOptions, ModelSession};
//! use fmbridge::backend::HostBackend;
//! use fmbridge::layer::LoggingLayer;
//! use std::collections::HashMap;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // The embedding host registers the platform handlers.
//! let backend = HostBackend::builder()
//!     .on_generate(|req| async move { platform_generate(req).await })
//!     .build()?;
//!
//! let session = ModelSession::builder(backend)
//!     .layer(LoggingLayer::new())
//!     .finish();
//!
//! let mut schema = HashMap::new();
//! schema.insert(
//!     "rating".to_string(),
//!     FieldSchema::new(FieldKind::Number).with_description("Score out of 10"),
//! );
//!
//! let extraction = session
//!     .extract("Rate this album.", &schema, GenerateOptions::new())
//!     .await?;
//! println!("{:?}", extraction.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Includes `backends` and `layers`
//! - `backends`: Host and scripted backend implementations
//! - `layers`: Built-in layers (logging, timeout, readiness)
//! - `schema`: Re-export of `schemars` for host-side schema generation
//! - `full`: All features enabled

// Re-export core types and traits
pub use fmbridge_core::*;

// Re-export backends under `backend` module
#[cfg(feature = "fmbridge-backend")]
pub mod backend {
    //! Backend implementations.
    pub use fmbridge_backend::*;
}

// Re-export layers under `layer` module
#[cfg(feature = "fmbridge-layer")]
pub mod layer {
    //! Built-in middleware layers.
    pub use fmbridge_layer::*;
}

// Re-export schemars when schema feature is enabled
#[cfg(feature = "schema")]
pub mod schemars {
    pub use ::schemars::*;
}

// Convenience re-exports at root level for common types
pub use fmbridge_core::{
    capability::ModelBackend,
    error::FmError,
    layer::{Layer, LayeredBackend},
    runtime::ModelSession,
    schema::{render_schema, FieldKind, FieldSchema},
    types::{
        ArticleAnalysis, Availability, BackendInfo, Classification, Contact, ContactList,
        Extraction, GenerateOptions, GenerateRequest, GenerationReply, KeywordList,
        RequestContext, Sentiment, StreamEvent, TypedContent, TypedKind,
    },
    Result,
};

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module containing the most commonly used types and traits.
    //!
    //! ```
    //! use fmbridge::prelude::*;
    //! ```

    pub use crate::{
        Availability, Extraction, FieldKind, FieldSchema, FmError, GenerateOptions,
        GenerationReply, Layer, ModelBackend, ModelSession, Result, StreamEvent, TypedContent,
        TypedKind,
    };

    #[cfg(feature = "fmbridge-backend")]
    pub use crate::backend::*;

    #[cfg(feature = "fmbridge-layer")]
    pub use crate::layer::*;
}
