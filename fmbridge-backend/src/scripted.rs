//! Scripted backend for tests and examples.
//!
//! A substitute implementation of the generation capability: replies are
//! queued up front and popped in order, the readiness state is settable,
//! and every dispatched request is recorded so tests can assert on the
//! composed prompt text.

use fmbridge_core::capability::{ModelBackend, TextDeltaStream};
use fmbridge_core::error::FmError;
use fmbridge_core::types::*;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One queued reply.
#[derive(Debug)]
pub enum ScriptedReply {
    /// Single-shot text reply
    Text(String),
    /// Natively-typed fixed-schema reply
    Typed(TypedContent),
    /// Streamed reply delivered as the given chunks
    Chunks(Vec<String>),
    /// Streamed reply that fails mid-stream after the given chunks
    ChunksThenFail(Vec<String>, FmError),
    /// Capability failure
    Fail(FmError),
}

/// Scripted stand-in for the on-device generation capability.
///
/// Interior state is shared across clones, so a clone kept outside a
/// session can queue replies and inspect recorded requests.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    info: Arc<BackendInfo>,
    availability: Arc<Mutex<Availability>>,
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Create a ready, empty scripted backend
    pub fn new() -> Self {
        Self {
            info: Arc::new(BackendInfo {
                id: "scripted".to_string(),
                name: "Scripted".to_string(),
            }),
            availability: Arc::new(Mutex::new(Availability::Ready)),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the readiness state reported to callers
    pub fn with_availability(self, availability: Availability) -> Self {
        *self.availability.lock().unwrap() = availability;
        self
    }

    /// Change the readiness state of an existing backend
    pub fn set_availability(&self, availability: Availability) {
        *self.availability.lock().unwrap() = availability;
    }

    /// Queue a text reply
    pub fn push_text(self, text: impl Into<String>) -> Self {
        self.push(ScriptedReply::Text(text.into()))
    }

    /// Queue a typed reply
    pub fn push_typed(self, content: TypedContent) -> Self {
        self.push(ScriptedReply::Typed(content))
    }

    /// Queue a streamed reply
    pub fn push_chunks(self, chunks: Vec<&str>) -> Self {
        self.push(ScriptedReply::Chunks(
            chunks.into_iter().map(String::from).collect(),
        ))
    }

    /// Queue a streamed reply that fails after the given chunks
    pub fn push_chunks_then_fail(self, chunks: Vec<&str>, error: FmError) -> Self {
        self.push(ScriptedReply::ChunksThenFail(
            chunks.into_iter().map(String::from).collect(),
            error,
        ))
    }

    /// Queue a capability failure
    pub fn push_failure(self, error: FmError) -> Self {
        self.push(ScriptedReply::Fail(error))
    }

    fn push(self, reply: ScriptedReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn pop(&self) -> Option<ScriptedReply> {
        self.replies.lock().unwrap().pop_front()
    }

    fn record(&self, req: &GenerateRequest) {
        self.requests.lock().unwrap().push(req.clone());
    }

    /// All requests dispatched so far
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompt text of the most recent request
    pub fn last_prompt(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone())
    }

    /// Number of requests dispatched so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn info(&self) -> Arc<BackendInfo> {
        self.info.clone()
    }

    async fn availability(&self) -> Availability {
        self.availability.lock().unwrap().clone()
    }

    async fn generate(&self, req: GenerateRequest) -> Result<String, FmError> {
        self.record(&req);
        match self.pop() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(err)) => Err(err),
            Some(other) => Err(FmError::other(format!(
                "scripted reply mismatch: expected text, got {other:?}"
            ))),
            None => Err(FmError::other("no scripted reply queued")),
        }
    }

    async fn generate_typed(
        &self,
        req: GenerateRequest,
        target: TypedKind,
    ) -> Result<TypedContent, FmError> {
        self.record(&req);
        match self.pop() {
            Some(ScriptedReply::Typed(content)) => {
                if content.kind() != target {
                    return Err(FmError::other(format!(
                        "scripted reply mismatch: queued {:?}, requested {:?}",
                        content.kind(),
                        target
                    )));
                }
                Ok(content)
            }
            Some(ScriptedReply::Fail(err)) => Err(err),
            Some(other) => Err(FmError::other(format!(
                "scripted reply mismatch: expected typed, got {other:?}"
            ))),
            None => Err(FmError::other("no scripted reply queued")),
        }
    }

    async fn stream_generate(&self, req: GenerateRequest) -> Result<Box<TextDeltaStream>, FmError> {
        self.record(&req);
        match self.pop() {
            Some(ScriptedReply::Chunks(chunks)) => {
                let items: Vec<Result<String, FmError>> = chunks.into_iter().map(Ok).collect();
                Ok(Box::new(tokio_stream::iter(items)))
            }
            Some(ScriptedReply::ChunksThenFail(chunks, err)) => {
                let mut items: Vec<Result<String, FmError>> =
                    chunks.into_iter().map(Ok).collect();
                items.push(Err(err));
                Ok(Box::new(tokio_stream::iter(items)))
            }
            Some(ScriptedReply::Fail(err)) => Err(err),
            Some(other) => Err(FmError::other(format!(
                "scripted reply mismatch: expected chunks, got {other:?}"
            ))),
            None => Err(FmError::other("no scripted reply queued")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn replies_pop_in_queue_order() {
        let backend = ScriptedBackend::new()
            .push_text("first")
            .push_text("second");

        let a = backend.generate(GenerateRequest::new("p1")).await.unwrap();
        let b = backend.generate(GenerateRequest::new("p2")).await.unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("first", "second"));
        assert_eq!(backend.request_count(), 2);
        assert_eq!(backend.last_prompt().as_deref(), Some("p2"));
    }

    #[tokio::test]
    async fn queued_failure_surfaces_as_error() {
        let backend = ScriptedBackend::new().push_failure(FmError::ModelDownloading);
        let err = backend
            .generate(GenerateRequest::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::ModelDownloading));
    }

    #[tokio::test]
    async fn chunks_stream_in_order() {
        let backend = ScriptedBackend::new().push_chunks(vec!["Hel", "lo"]);
        let mut stream = backend
            .stream_generate(GenerateRequest::new("p"))
            .await
            .unwrap();

        let mut collected = Vec::new();
        while let Some(item) = stream.next().await {
            collected.push(item.unwrap());
        }
        assert_eq!(collected, vec!["Hel".to_string(), "lo".to_string()]);
    }

    #[tokio::test]
    async fn typed_reply_checks_the_requested_kind() {
        let backend = ScriptedBackend::new().push_typed(TypedContent::KeywordList(KeywordList {
            keywords: vec!["a".to_string()],
        }));
        let err = backend
            .generate_typed(GenerateRequest::new("p"), TypedKind::Classification)
            .await
            .unwrap_err();
        assert!(matches!(err, FmError::Other(_)));
    }
}
