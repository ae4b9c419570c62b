//! Host-registered backend.
//!
//! The on-device model is a vendor-owned capability that only the
//! embedding host can reach. `HostBackend` models that boundary: the host
//! registers async handlers for each capability operation through a
//! builder, and the bridge calls whatever was registered. Operations the
//! host never wired up fail with `Unsupported` instead of panicking.

use fmbridge_core::capability::{ModelBackend, TextDeltaStream};
use fmbridge_core::error::FmError;
use fmbridge_core::types::*;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type GenerateHandler =
    Arc<dyn Fn(GenerateRequest) -> BoxFuture<Result<String, FmError>> + Send + Sync>;
type TypedHandler =
    Arc<dyn Fn(GenerateRequest, TypedKind) -> BoxFuture<Result<Value, FmError>> + Send + Sync>;
type StreamHandler =
    Arc<dyn Fn(GenerateRequest) -> BoxFuture<Result<Box<TextDeltaStream>, FmError>> + Send + Sync>;
type AvailabilityProbe = Arc<dyn Fn() -> BoxFuture<Availability> + Send + Sync>;

/// Backend whose operations are host-registered handler closures.
///
/// The typed handler returns raw JSON as the host produced it; decoding
/// into the closed [`TypedContent`] vocabulary happens here, on the bridge
/// side of the boundary.
#[derive(Clone)]
pub struct HostBackend {
    info: Arc<BackendInfo>,
    generate: GenerateHandler,
    generate_typed: Option<TypedHandler>,
    stream: Option<StreamHandler>,
    availability: Option<AvailabilityProbe>,
}

impl std::fmt::Debug for HostBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBackend")
            .field("info", &self.info)
            .field("typed_registered", &self.generate_typed.is_some())
            .field("stream_registered", &self.stream.is_some())
            .finish()
    }
}

impl HostBackend {
    /// Create a builder for registering host handlers
    pub fn builder() -> HostBackendBuilder {
        HostBackendBuilder::default()
    }
}

#[async_trait]
impl ModelBackend for HostBackend {
    fn info(&self) -> Arc<BackendInfo> {
        self.info.clone()
    }

    async fn availability(&self) -> Availability {
        match &self.availability {
            Some(probe) => probe().await,
            // Hosts that never report a state are assumed ready; the
            // capability itself still fails calls it cannot serve.
            None => Availability::Ready,
        }
    }

    async fn generate(&self, req: GenerateRequest) -> Result<String, FmError> {
        (self.generate)(req).await
    }

    async fn generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError> {
        let handler = self
            .generate_typed
            .as_ref()
            .ok_or_else(|| FmError::unsupported("typed generation not registered by host"))?;

        let value = handler(req, target).await?;
        target.decode(value)
    }

    async fn stream_generate(&self, req: GenerateRequest) -> Result<Box<TextDeltaStream>, FmError> {
        let handler = self
            .stream
            .as_ref()
            .ok_or_else(|| FmError::unsupported("streaming not registered by host"))?;

        handler(req).await
    }
}

/// Builder for a host-registered backend
#[derive(Default)]
pub struct HostBackendBuilder {
    id: Option<String>,
    name: Option<String>,
    generate: Option<GenerateHandler>,
    generate_typed: Option<TypedHandler>,
    stream: Option<StreamHandler>,
    availability: Option<AvailabilityProbe>,
}

impl HostBackendBuilder {
    /// Set the backend identifier (defaults to "host")
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the backend display name (defaults to "Host")
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register the single-shot generation handler (required)
    pub fn on_generate<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(GenerateRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, FmError>> + Send + 'static,
    {
        self.generate = Some(Arc::new(move |req| Box::pin(handler(req))));
        self
    }

    /// Register the fixed-schema generation handler.
    ///
    /// The handler returns the host's raw JSON value; the backend decodes
    /// it into the matching [`TypedContent`] variant.
    pub fn on_generate_typed<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(GenerateRequest, TypedKind) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, FmError>> + Send + 'static,
    {
        self.generate_typed = Some(Arc::new(move |req, target| Box::pin(handler(req, target))));
        self
    }

    /// Register the streaming generation handler
    pub fn on_stream<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(GenerateRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Box<TextDeltaStream>, FmError>> + Send + 'static,
    {
        self.stream = Some(Arc::new(move |req| Box::pin(handler(req))));
        self
    }

    /// Register the readiness probe
    pub fn on_availability<F, Fut>(mut self, probe: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Availability> + Send + 'static,
    {
        self.availability = Some(Arc::new(move || Box::pin(probe())));
        self
    }

    /// Build the backend
    pub fn build(self) -> Result<HostBackend, FmError> {
        let generate = self
            .generate
            .ok_or_else(|| FmError::invalid_request("a generate handler is required"))?;

        Ok(HostBackend {
            info: Arc::new(BackendInfo {
                id: self.id.unwrap_or_else(|| "host".to_string()),
                name: self.name.unwrap_or_else(|| "Host".to_string()),
            }),
            generate,
            generate_typed: self.generate_typed,
            stream: self.stream,
            availability: self.availability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn generate_calls_the_registered_handler() {
        let backend = HostBackend::builder()
            .on_generate(|req| async move { Ok(format!("echo: {}", req.prompt)) })
            .build()
            .unwrap();

        let reply = backend.generate(GenerateRequest::new("hi")).await.unwrap();
        assert_eq!(reply, "echo: hi");
    }

    #[tokio::test]
    async fn build_without_generate_handler_fails() {
        let err = HostBackend::builder().build().unwrap_err();
        assert!(matches!(err, FmError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn typed_handler_json_is_decoded_into_the_variant() {
        let backend = HostBackend::builder()
            .on_generate(|_| async { Ok(String::new()) })
            .on_generate_typed(|_, _| async { Ok(json!({"keywords": ["swift", "rust"]})) })
            .build()
            .unwrap();

        let content = backend
            .generate_typed(GenerateRequest::new("p"), TypedKind::KeywordList)
            .await
            .unwrap();
        assert_eq!(content.kind(), TypedKind::KeywordList);
    }

    #[tokio::test]
    async fn malformed_host_json_is_a_serialization_error() {
        let backend = HostBackend::builder()
            .on_generate(|_| async { Ok(String::new()) })
            .on_generate_typed(|_, _| async { Ok(json!({"keywords": 7})) })
            .build()
            .unwrap();

        let err = backend
            .generate_typed(GenerateRequest::new("p"), TypedKind::KeywordList)
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::Serialization(_)));
    }

    #[tokio::test]
    async fn unregistered_operations_report_unsupported() {
        let backend = HostBackend::builder()
            .on_generate(|_| async { Ok(String::new()) })
            .build()
            .unwrap();

        let err = backend
            .generate_typed(GenerateRequest::new("p"), TypedKind::KeywordList)
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::Unsupported(_)));

        let err = match backend.stream_generate(GenerateRequest::new("p")).await {
            Ok(_) => panic!("expected stream_generate to report Unsupported"),
            Err(e) => e,
        };
        assert!(matches!(err, FmError::Unsupported(_)));
    }

    #[tokio::test]
    async fn availability_defaults_to_ready_without_a_probe() {
        let backend = HostBackend::builder()
            .on_generate(|_| async { Ok(String::new()) })
            .build()
            .unwrap();
        assert!(backend.availability().await.is_ready());
    }

    #[tokio::test]
    async fn availability_probe_is_consulted() {
        let backend = HostBackend::builder()
            .on_generate(|_| async { Ok(String::new()) })
            .on_availability(|| async { Availability::ModelDownloading })
            .build()
            .unwrap();
        assert_eq!(
            backend.availability().await,
            Availability::ModelDownloading
        );
    }
}
