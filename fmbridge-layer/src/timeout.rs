//! Deadline layer for backend operations.
//!
//! The session itself never models timeouts; this layer wraps each
//! capability call with an external deadline and synthesizes a
//! `FmError::Timeout` outcome, leaving the normalizer contract untouched.

use fmbridge_core::capability::{ModelBackend, TextDeltaStream};
use fmbridge_core::error::FmError;
use fmbridge_core::layer::{Layer, LayeredBackend};
use fmbridge_core::types::*;
use async_trait::async_trait;
use std::time::Duration;

/// Timeout layer configuration
#[derive(Debug, Clone)]
pub struct TimeoutLayer {
    deadline: Duration,
}

impl TimeoutLayer {
    /// Create a timeout layer with the given per-call deadline
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

impl Default for TimeoutLayer {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl<B: ModelBackend> Layer<B> for TimeoutLayer {
    type LayeredBackend = TimeoutBackend<B>;

    fn layer(&self, inner: B) -> Self::LayeredBackend {
        TimeoutBackend {
            inner,
            deadline: self.deadline,
        }
    }
}

/// Backend wrapped with a per-call deadline
#[derive(Debug)]
pub struct TimeoutBackend<B> {
    inner: B,
    deadline: Duration,
}

impl<B> TimeoutBackend<B> {
    fn elapsed_error(&self) -> FmError {
        FmError::timeout(format!("no result within {:?}", self.deadline))
    }
}

#[async_trait]
impl<B: ModelBackend> LayeredBackend for TimeoutBackend<B> {
    type Inner = B;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_generate(&self, req: GenerateRequest) -> Result<String, FmError> {
        match tokio::time::timeout(self.deadline, self.inner.generate(req)).await {
            Ok(result) => result,
            Err(_) => Err(self.elapsed_error()),
        }
    }

    async fn layered_generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError> {
        match tokio::time::timeout(self.deadline, self.inner.generate_typed(req, target)).await {
            Ok(result) => result,
            Err(_) => Err(self.elapsed_error()),
        }
    }

    async fn layered_stream_generate(
        &self,
        req: GenerateRequest,
    ) -> Result<Box<TextDeltaStream>, FmError> {
        // The deadline guards stream establishment only; items already
        // flowing are not raced against it.
        match tokio::time::timeout(self.deadline, self.inner.stream_generate(req)).await {
            Ok(result) => result,
            Err(_) => Err(self.elapsed_error()),
        }
    }
}

fmbridge_core::impl_layered_backend!(TimeoutBackend<B>);

#[cfg(test)]
mod tests {
    use super::*;
    use fmbridge_core::ModelSession;
    use std::sync::Arc;

    #[derive(Debug)]
    struct SlowBackend {
        latency: Duration,
    }

    #[async_trait]
    impl ModelBackend for SlowBackend {
        fn info(&self) -> Arc<BackendInfo> {
            Arc::new(BackendInfo {
                id: "slow".to_string(),
                name: "Slow".to_string(),
            })
        }

        async fn availability(&self) -> Availability {
            Availability::Ready
        }

        async fn generate(&self, _req: GenerateRequest) -> Result<String, FmError> {
            tokio::time::sleep(self.latency).await;
            Ok("done".to_string())
        }

        async fn generate_typed(
            &self,
            _req: GenerateRequest,
            _target: TypedKind,
        ) -> Result<TypedContent, FmError> {
            Err(FmError::unsupported("not under test"))
        }

        async fn stream_generate(
            &self,
            _req: GenerateRequest,
        ) -> Result<Box<TextDeltaStream>, FmError> {
            tokio::time::sleep(self.latency).await;
            Err(FmError::unsupported("not under test"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_call_synthesizes_a_timeout() {
        let session = ModelSession::builder(SlowBackend {
            latency: Duration::from_secs(60),
        })
        .layer(TimeoutLayer::new(Duration::from_secs(1)))
        .finish();

        let err = session
            .generate_text("hi", GenerateOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_call_is_untouched() {
        let session = ModelSession::builder(SlowBackend {
            latency: Duration::from_millis(10),
        })
        .layer(TimeoutLayer::new(Duration::from_secs(1)))
        .finish();

        let reply = session
            .generate_text("hi", GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(reply, "done");
    }
}
