//! The generation capability trait and core abstractions.

use crate::error::FmError;
use crate::types::*;
use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::sync::Arc;

/// Stream type alias for raw text deltas produced by a backend
pub type TextDeltaStream = dyn Stream<Item = Result<String, FmError>> + Send + Unpin;

/// Stream type alias for session-level streaming notifications
pub type EventStream = dyn Stream<Item = Result<StreamEvent, FmError>> + Send + Unpin;

/// The opaque generation capability.
///
/// This trait is the entire boundary to the platform-supplied model: submit
/// a prompt, receive text, streamed text deltas, or a natively-typed value,
/// or fail with a reason from the closed `FmError` capability set. The
/// session layer builds prompt composition, schema rendering, and reply
/// normalization on top of these four operations.
#[async_trait]
pub trait ModelBackend: Send + Sync + Debug + 'static {
    /// Get backend information
    fn info(&self) -> Arc<BackendInfo>;

    /// Report the current readiness state.
    ///
    /// A simple state query; callers wanting retry-until-ready behavior
    /// stack a `ReadinessLayer` rather than polling here.
    async fn availability(&self) -> Availability;

    /// Single-shot text generation
    async fn generate(&self, req: GenerateRequest) -> Result<String, FmError>;

    /// Fixed-schema generation.
    ///
    /// The capability natively supports the closed `TypedKind` vocabulary
    /// and guarantees type-conformant output; no text parsing is involved.
    async fn generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError>;

    /// Streaming text generation.
    ///
    /// Deltas are delivered in generation order; a mid-stream failure is
    /// surfaced as an `Err` item and terminates the stream.
    async fn stream_generate(&self, req: GenerateRequest) -> Result<Box<TextDeltaStream>, FmError>;
}

/// Helper to collect a backend delta stream into the full reply text
pub async fn collect_delta_stream(mut stream: Box<TextDeltaStream>) -> Result<String, FmError> {
    use futures::StreamExt;

    let mut text = String::new();
    while let Some(delta) = stream.next().await {
        text.push_str(&delta?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn collect_concatenates_deltas_in_order() {
        let deltas = stream::iter(vec![Ok("Hel".to_string()), Ok("lo".to_string())]);
        let text = collect_delta_stream(Box::new(deltas)).await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn collect_propagates_mid_stream_failure() {
        let deltas = stream::iter(vec![
            Ok("Hel".to_string()),
            Err(FmError::stream("connection dropped")),
        ]);
        let err = collect_delta_stream(Box::new(deltas)).await.unwrap_err();
        assert!(matches!(err, FmError::Stream(_)));
    }
}
