//! Logging layer for backend operations.

use fmbridge_core::capability::{ModelBackend, TextDeltaStream};
use fmbridge_core::error::FmError;
use fmbridge_core::layer::{Layer, LayeredBackend};
use fmbridge_core::types::*;
use async_trait::async_trait;

/// Logging layer that logs backend operations.
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    prefix: String,
}

impl LoggingLayer {
    /// Create a new logging layer
    pub fn new() -> Self {
        Self {
            prefix: "[fmbridge]".to_string(),
        }
    }

    /// Create a logging layer with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ModelBackend> Layer<B> for LoggingLayer {
    type LayeredBackend = LoggingBackend<B>;

    fn layer(&self, inner: B) -> Self::LayeredBackend {
        LoggingBackend {
            inner,
            prefix: self.prefix.clone(),
        }
    }
}

/// Backend wrapped with logging
#[derive(Debug)]
pub struct LoggingBackend<B> {
    inner: B,
    prefix: String,
}

#[async_trait]
impl<B: ModelBackend> LayeredBackend for LoggingBackend<B> {
    type Inner = B;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_availability(&self) -> Availability {
        let state = self.inner.availability().await;
        tracing::debug!("{} availability: {:?}", self.prefix, state);
        state
    }

    async fn layered_generate(&self, req: GenerateRequest) -> Result<String, FmError> {
        tracing::debug!(
            "{} generate request: prompt_len={}",
            self.prefix,
            req.prompt.len()
        );

        let start = std::time::Instant::now();
        let result = self.inner.generate(req).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::debug!(
                    "{} generate success: reply_len={}, elapsed={:?}",
                    self.prefix,
                    reply.len(),
                    elapsed
                );
            }
            Err(e) => {
                tracing::error!("{} generate error: {:?}, elapsed={:?}", self.prefix, e, elapsed);
            }
        }

        result
    }

    async fn layered_generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError> {
        tracing::debug!(
            "{} generate_typed request: target={:?}, prompt_len={}",
            self.prefix,
            target,
            req.prompt.len()
        );

        let start = std::time::Instant::now();
        let result = self.inner.generate_typed(req, target).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    "{} generate_typed success: target={:?}, elapsed={:?}",
                    self.prefix,
                    target,
                    elapsed
                );
            }
            Err(e) => {
                tracing::error!(
                    "{} generate_typed error: {:?}, elapsed={:?}",
                    self.prefix,
                    e,
                    elapsed
                );
            }
        }

        result
    }

    async fn layered_stream_generate(
        &self,
        req: GenerateRequest,
    ) -> Result<Box<TextDeltaStream>, FmError> {
        tracing::debug!(
            "{} stream_generate request: prompt_len={}",
            self.prefix,
            req.prompt.len()
        );

        let start = std::time::Instant::now();
        let result = self.inner.stream_generate(req).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!("{} stream_generate opened, elapsed={:?}", self.prefix, elapsed);
            }
            Err(e) => {
                tracing::error!(
                    "{} stream_generate error: {:?}, elapsed={:?}",
                    self.prefix,
                    e,
                    elapsed
                );
            }
        }

        result
    }
}

fmbridge_core::impl_layered_backend!(LoggingBackend<B>);
