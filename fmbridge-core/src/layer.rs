//! Layer trait and abstractions.
//!
//! Layers provide a composable way to wrap backends with operational
//! concerns (logging, deadlines, readiness polling) without touching the
//! session's request protocol. The session itself never retries or polls;
//! everything of that kind lives in a layer stacked around the backend.

use crate::capability::{ModelBackend, TextDeltaStream};
use crate::error::FmError;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Layer trait for wrapping backends.
///
/// Each layer wraps an inner backend and returns a new backend with
/// enhanced behavior; composition happens with static dispatch while the
/// session is being built.
pub trait Layer<B: ModelBackend> {
    /// The type of the layered backend
    type LayeredBackend: ModelBackend;

    /// Wrap the inner backend with this layer
    fn layer(&self, inner: B) -> Self::LayeredBackend;
}

/// Helper trait for layered backends.
///
/// Provides default forwarding implementations for every capability
/// operation; implementers only override the operations they intercept.
#[async_trait]
pub trait LayeredBackend: Sized + ModelBackend {
    /// The inner backend type
    type Inner: ModelBackend;

    /// Get a reference to the inner backend
    fn inner(&self) -> &Self::Inner;

    /// Default implementation for info - forwards to inner
    fn layered_info(&self) -> Arc<BackendInfo> {
        self.inner().info()
    }

    /// Default implementation for availability - forwards to inner
    async fn layered_availability(&self) -> Availability {
        self.inner().availability().await
    }

    /// Default implementation for generate - forwards to inner
    async fn layered_generate(&self, req: GenerateRequest) -> Result<String, FmError> {
        self.inner().generate(req).await
    }

    /// Default implementation for generate_typed - forwards to inner
    async fn layered_generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError> {
        self.inner().generate_typed(req, target).await
    }

    /// Default implementation for stream_generate - forwards to inner
    async fn layered_stream_generate(
        &self,
        req: GenerateRequest,
    ) -> Result<Box<TextDeltaStream>, FmError> {
        self.inner().stream_generate(req).await
    }
}

/// Macro to implement ModelBackend by forwarding to LayeredBackend methods.
///
/// This reduces boilerplate for layered backends generic over their inner
/// backend, e.g. `impl_layered_backend!(LoggingBackend<B>)`.
#[macro_export]
macro_rules! impl_layered_backend {
    ($backend:ident<$inner:ident>) => {
        #[async_trait::async_trait]
        impl<$inner: $crate::capability::ModelBackend> $crate::capability::ModelBackend
            for $backend<$inner>
        {
            fn info(&self) -> std::sync::Arc<$crate::types::BackendInfo> {
                $crate::layer::LayeredBackend::layered_info(self)
            }

            async fn availability(&self) -> $crate::types::Availability {
                $crate::layer::LayeredBackend::layered_availability(self).await
            }

            async fn generate(
                &self,
                req: $crate::types::GenerateRequest,
            ) -> Result<String, $crate::error::FmError> {
                $crate::layer::LayeredBackend::layered_generate(self, req).await
            }

            async fn generate_typed(
                &self,
                req: $crate::types::GenerateRequest,
                target: $crate::types::TypedKind,
            ) -> Result<$crate::types::TypedContent, $crate::error::FmError> {
                $crate::layer::LayeredBackend::layered_generate_typed(self, req, target).await
            }

            async fn stream_generate(
                &self,
                req: $crate::types::GenerateRequest,
            ) -> Result<Box<$crate::capability::TextDeltaStream>, $crate::error::FmError> {
                $crate::layer::LayeredBackend::layered_stream_generate(self, req).await
            }
        }
    };
}
