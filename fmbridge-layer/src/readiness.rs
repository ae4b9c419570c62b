//! Readiness polling layer with exponential backoff.
//!
//! The session checks availability exactly once and never waits; this
//! layer is the surrounding operational tooling that polls a
//! still-initializing capability (model assets downloading) before
//! dispatching. States that waiting cannot fix (not enabled, not
//! eligible) fail fast.

use fmbridge_core::capability::{ModelBackend, TextDeltaStream};
use fmbridge_core::error::FmError;
use fmbridge_core::layer::{Layer, LayeredBackend};
use fmbridge_core::types::*;
use async_trait::async_trait;
use std::time::Duration;

/// Readiness layer configuration
#[derive(Debug, Clone)]
pub struct ReadinessLayer {
    max_probes: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
}

impl ReadinessLayer {
    /// Create a new readiness layer with default settings
    pub fn new() -> Self {
        Self {
            max_probes: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    /// Set maximum number of availability probes
    pub fn with_max_probes(mut self, max_probes: u32) -> Self {
        self.max_probes = max_probes;
        self
    }

    /// Set initial delay between probes
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Set maximum delay between probes
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculate delay for a given probe
    fn calculate_delay(&self, probe: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(probe as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

impl Default for ReadinessLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ModelBackend> Layer<B> for ReadinessLayer {
    type LayeredBackend = ReadinessBackend<B>;

    fn layer(&self, inner: B) -> Self::LayeredBackend {
        ReadinessBackend {
            inner,
            config: self.clone(),
        }
    }
}

/// Backend wrapped with readiness polling
#[derive(Debug)]
pub struct ReadinessBackend<B> {
    inner: B,
    config: ReadinessLayer,
}

impl<B: ModelBackend> ReadinessBackend<B> {
    /// Wait until the capability reports ready, or fail with the state
    /// that blocked the last probe.
    async fn await_ready(&self) -> Result<(), FmError> {
        let mut probe = 0;

        loop {
            match self.inner.availability().await.into_error() {
                None => return Ok(()),
                Some(err) => {
                    if !err.is_retryable() || probe >= self.config.max_probes {
                        return Err(err);
                    }

                    let delay = self.config.calculate_delay(probe);
                    tracing::debug!(
                        "capability not ready (probe {}/{}), waiting {:?}",
                        probe + 1,
                        self.config.max_probes,
                        delay
                    );

                    tokio::time::sleep(delay).await;
                    probe += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<B: ModelBackend> LayeredBackend for ReadinessBackend<B> {
    type Inner = B;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_generate(&self, req: GenerateRequest) -> Result<String, FmError> {
        self.await_ready().await?;
        self.inner.generate(req).await
    }

    async fn layered_generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError> {
        self.await_ready().await?;
        self.inner.generate_typed(req, target).await
    }

    async fn layered_stream_generate(
        &self,
        req: GenerateRequest,
    ) -> Result<Box<TextDeltaStream>, FmError> {
        self.await_ready().await?;
        self.inner.stream_generate(req).await
    }
}

fmbridge_core::impl_layered_backend!(ReadinessBackend<B>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Reports `ModelDownloading` for the first `ready_after` probes.
    #[derive(Debug)]
    struct WarmingBackend {
        probes: AtomicU32,
        ready_after: u32,
        terminal: Availability,
    }

    impl WarmingBackend {
        fn downloading_until(ready_after: u32) -> Self {
            Self {
                probes: AtomicU32::new(0),
                ready_after,
                terminal: Availability::ModelDownloading,
            }
        }

        fn stuck(state: Availability) -> Self {
            Self {
                probes: AtomicU32::new(0),
                ready_after: u32::MAX,
                terminal: state,
            }
        }
    }

    #[async_trait]
    impl ModelBackend for WarmingBackend {
        fn info(&self) -> Arc<BackendInfo> {
            Arc::new(BackendInfo {
                id: "warming".to_string(),
                name: "Warming".to_string(),
            })
        }

        async fn availability(&self) -> Availability {
            let seen = self.probes.fetch_add(1, Ordering::SeqCst);
            if seen >= self.ready_after {
                Availability::Ready
            } else {
                self.terminal.clone()
            }
        }

        async fn generate(&self, _req: GenerateRequest) -> Result<String, FmError> {
            Ok("warmed up".to_string())
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
            Err(FmError::unsupported("not under test"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_once_the_capability_becomes_ready() {
        let layered = ReadinessLayer::new()
            .with_max_probes(5)
            .with_initial_delay(Duration::from_millis(10))
            .layer(WarmingBackend::downloading_until(3));

        let reply = layered.generate(GenerateRequest::new("hi")).await.unwrap();
        assert_eq!(reply, "warmed up");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_probe_budget() {
        let layered = ReadinessLayer::new()
            .with_max_probes(2)
            .with_initial_delay(Duration::from_millis(10))
            .layer(WarmingBackend::stuck(Availability::ModelDownloading));

        let err = layered
            .generate(GenerateRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::ModelDownloading));
    }

    #[tokio::test(start_paused = true)]
    async fn states_waiting_cannot_fix_fail_fast() {
        let backend = WarmingBackend::stuck(Availability::NotEnabled);
        let layered = ReadinessLayer::new().with_max_probes(5).layer(backend);

        let err = layered
            .generate(GenerateRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::NotEnabled));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let layer = ReadinessLayer::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(250))
            .with_backoff_multiplier(2.0);

        assert_eq!(layer.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(layer.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(layer.calculate_delay(2), Duration::from_millis(250));
    }
}
