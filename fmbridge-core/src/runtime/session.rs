//! ModelSession implementation.
//!
//! The session is the high-level entry point: it owns a type-erased
//! backend, carries optional session instructions, and orchestrates the
//! dynamic-schema, fixed-schema, and streaming request paths.

use crate::capability::{EventStream, ModelBackend};
use crate::error::FmError;
use crate::layer::Layer;
use crate::normalize::normalize_reply;
use crate::prompt::compose_prompt;
use crate::schema::{render_schema, FieldSchema};
use crate::types::*;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased backend that can be shared across threads
type BoxedBackend = Arc<dyn ModelBackend>;

/// Builder for composing a session from a backend and layers.
///
/// Layers wrap the backend with static dispatch while building; the
/// finished session holds a single type-erased backend.
///
/// # Example
///
/// ```ignore
/// let session = ModelSession::builder(backend)
///     .layer(LoggingLayer::new())
///     .instructions("You are a concise assistant.")
///     .finish();
/// ```
pub struct ModelSessionBuilder<B> {
    backend: B,
    instructions: Option<String>,
}

impl<B: ModelBackend> ModelSessionBuilder<B> {
    /// Create a new builder with a backend
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            instructions: None,
        }
    }

    /// Add a layer to wrap the backend
    pub fn layer<L>(self, layer: L) -> ModelSessionBuilder<L::LayeredBackend>
    where
        L: Layer<B>,
    {
        ModelSessionBuilder {
            backend: layer.layer(self.backend),
            instructions: self.instructions,
        }
    }

    /// Set session-level instructions forwarded with every request
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Finish building and create a ModelSession
    pub fn finish(self) -> ModelSession {
        ModelSession {
            backend: Arc::new(self.backend),
            instructions: self.instructions,
        }
    }
}

/// A reusable handle onto the generation capability.
///
/// Each call is an independent computation: nothing is cached or retained
/// across calls, and a request resolves to exactly one outcome. The
/// session does not serialize concurrent calls against itself; issuing two
/// requests at once is the caller's hazard.
pub struct ModelSession {
    backend: BoxedBackend,
    instructions: Option<String>,
}

impl ModelSession {
    /// Create a new builder
    pub fn builder<B: ModelBackend>(backend: B) -> ModelSessionBuilder<B> {
        ModelSessionBuilder::new(backend)
    }

    /// Get backend information
    pub fn info(&self) -> Arc<BackendInfo> {
        self.backend.info()
    }

    /// Report the capability's current readiness state
    pub async fn availability(&self) -> Availability {
        self.backend.availability().await
    }

    /// Single readiness check before dispatch. The session never retries
    /// or polls; stacking a ReadinessLayer is the way to wait.
    async fn gate(&self) -> Result<(), FmError> {
        match self.backend.availability().await.into_error() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    fn validate_prompt(prompt: &str) -> Result<(), FmError> {
        if prompt.trim().is_empty() {
            return Err(FmError::invalid_request("prompt must not be empty"));
        }
        Ok(())
    }

    fn request(&self, prompt: String, options: GenerateOptions) -> GenerateRequest {
        GenerateRequest {
            prompt,
            instructions: self.instructions.clone(),
            options,
        }
    }

    /// Generate free text for a prompt.
    pub async fn generate_text(
        &self,
        prompt: impl Into<String>,
        options: GenerateOptions,
    ) -> Result<String, FmError> {
        let prompt = prompt.into();
        Self::validate_prompt(&prompt)?;
        self.gate().await?;

        let ctx = RequestContext::new(self.backend.info().id.clone());
        tracing::debug!(
            request_id = %ctx.request_id,
            backend = %ctx.backend_id,
            "generate_text request"
        );

        self.backend.generate(self.request(prompt, options)).await
    }

    /// Generate structured data steered by a caller-supplied field schema.
    ///
    /// The schema is rendered into a JSON template block, embedded in the
    /// prompt with formatting constraints, and the raw reply is normalized.
    /// A reply that cannot be parsed as a JSON object degrades into an
    /// [`Extraction`] carrying the raw text and a warning; only capability
    /// failures resolve to `Err`.
    pub async fn extract(
        &self,
        prompt: impl Into<String>,
        schema: &HashMap<String, FieldSchema>,
        options: GenerateOptions,
    ) -> Result<Extraction, FmError> {
        let prompt = prompt.into();
        Self::validate_prompt(&prompt)?;
        self.gate().await?;

        let ctx = RequestContext::new(self.backend.info().id.clone());
        tracing::debug!(
            request_id = %ctx.request_id,
            backend = %ctx.backend_id,
            fields = schema.len(),
            "extract request"
        );

        let block = render_schema(schema);
        let composed = compose_prompt(&prompt, Some(&block));
        let raw = self.backend.generate(self.request(composed, options)).await?;

        let extraction = normalize_reply(&raw);
        if let Some(warning) = &extraction.warning {
            tracing::debug!(request_id = %ctx.request_id, warning = %warning, "extraction degraded");
        }
        Ok(extraction)
    }

    /// Generate one of the predeclared structured types.
    ///
    /// The caller prompt goes to the capability unmodified together with
    /// the target-type selector; the natively-typed result is relayed
    /// without any text parsing.
    pub async fn generate_typed(
        &self,
        prompt: impl Into<String>,
        target: TypedKind,
        options: GenerateOptions,
    ) -> Result<TypedContent, FmError> {
        let prompt = prompt.into();
        Self::validate_prompt(&prompt)?;
        self.gate().await?;

        let ctx = RequestContext::new(self.backend.info().id.clone());
        tracing::debug!(
            request_id = %ctx.request_id,
            backend = %ctx.backend_id,
            target = ?target,
            "generate_typed request"
        );

        self.backend
            .generate_typed(self.request(prompt, options), target)
            .await
    }

    /// Stream free text for a prompt.
    ///
    /// The returned stream yields zero or more `StreamEvent::Partial`
    /// items in generation order, then exactly one terminal item: either
    /// `StreamEvent::Complete` carrying the accumulated text, or an `Err`
    /// for a mid-stream capability failure. No terminal item precedes a
    /// partial and nothing follows the terminal item.
    pub async fn stream_text(
        &self,
        prompt: impl Into<String>,
        options: GenerateOptions,
    ) -> Result<Box<EventStream>, FmError> {
        let prompt = prompt.into();
        Self::validate_prompt(&prompt)?;
        self.gate().await?;

        let ctx = RequestContext::new(self.backend.info().id.clone());
        tracing::debug!(
            request_id = %ctx.request_id,
            backend = %ctx.backend_id,
            "stream_text request"
        );

        let mut deltas = self
            .backend
            .stream_generate(self.request(prompt, options))
            .await?;

        let events = async_stream::stream! {
            let mut text = String::new();
            while let Some(item) = deltas.next().await {
                match item {
                    Ok(delta) => {
                        text.push_str(&delta);
                        yield Ok(StreamEvent::Partial { delta });
                    }
                    Err(err) => {
                        // A mid-stream failure is the terminal outcome.
                        yield Err(err);
                        return;
                    }
                }
            }
            yield Ok(StreamEvent::Complete { text });
        };

        Ok(Box::new(Box::pin(events)) as Box<EventStream>)
    }
}
