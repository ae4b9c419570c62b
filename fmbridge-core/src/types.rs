//! Core types for bridge operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FmError;

/// Readiness state reported by the generation capability.
///
/// Every generation call is only meaningful when the capability reports
/// `Ready`. The session checks this once per call and short-circuits;
/// waiting for readiness is the job of `ReadinessLayer`, not the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Availability {
    /// The model is initialized and can serve requests
    Ready,
    /// Apple Intelligence is switched off in system settings
    NotEnabled,
    /// The device hardware cannot run the on-device model
    NotEligible,
    /// Model assets are still downloading
    ModelDownloading,
    /// Any other backend-reported reason
    Unavailable { reason: String },
}

impl Availability {
    /// Whether the capability can serve a generation request
    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready)
    }

    /// Convert a non-ready state into the matching error
    pub fn into_error(self) -> Option<FmError> {
        match self {
            Availability::Ready => None,
            Availability::NotEnabled => Some(FmError::NotEnabled),
            Availability::NotEligible => Some(FmError::NotEligible),
            Availability::ModelDownloading => Some(FmError::ModelDownloading),
            Availability::Unavailable { reason } => Some(FmError::Backend(reason)),
        }
    }
}

/// Backend information
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub id: String,
    pub name: String,
}

/// Sampling options forwarded to the generation capability
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Cap on the number of tokens in the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_response_tokens: Option<u32>,
}

impl GenerateOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the response token cap
    pub fn with_max_response_tokens(mut self, max_response_tokens: u32) -> Self {
        self.max_response_tokens = Some(max_response_tokens);
        self
    }
}

/// A single generation request handed to the capability.
///
/// Requests are constructed per call and discarded after their single
/// outcome is delivered; nothing is retained across calls.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Session-level instructions prepended by the backend, if any
    pub instructions: Option<String>,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// Create a new request from a prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            instructions: None,
            options: GenerateOptions::default(),
        }
    }

    /// Set session instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set sampling options
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Per-call context used for tracing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub backend_id: String,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(backend_id: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            backend_id: backend_id.into(),
        }
    }
}

/// Selector for the predeclared structured output types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedKind {
    ArticleAnalysis,
    ContactList,
    Classification,
    KeywordList,
}

impl TypedKind {
    /// Decode a host-supplied JSON value into the matching variant
    pub fn decode(&self, value: Value) -> Result<TypedContent, FmError> {
        Ok(match self {
            TypedKind::ArticleAnalysis => {
                TypedContent::ArticleAnalysis(serde_json::from_value(value)?)
            }
            TypedKind::ContactList => TypedContent::ContactList(serde_json::from_value(value)?),
            TypedKind::Classification => {
                TypedContent::Classification(serde_json::from_value(value)?)
            }
            TypedKind::KeywordList => TypedContent::KeywordList(serde_json::from_value(value)?),
        })
    }
}

/// Overall sentiment of an analyzed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

/// Structured analysis of an article or long-form text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
    pub categories: Vec<String>,
}

/// A single extracted contact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Contacts extracted from free text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactList {
    pub contacts: Vec<Contact>,
}

/// Single-label classification of a text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Keywords extracted from a text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordList {
    pub keywords: Vec<String>,
}

/// Natively-typed result of a fixed-schema request.
///
/// The capability guarantees type-conformant output for these variants, so
/// no text parsing is involved; the serde renames above are the static 1:1
/// relabeling to caller-facing keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedContent {
    ArticleAnalysis(ArticleAnalysis),
    ContactList(ContactList),
    Classification(Classification),
    KeywordList(KeywordList),
}

impl TypedContent {
    /// The selector this value conforms to
    pub fn kind(&self) -> TypedKind {
        match self {
            TypedContent::ArticleAnalysis(_) => TypedKind::ArticleAnalysis,
            TypedContent::ContactList(_) => TypedKind::ContactList,
            TypedContent::Classification(_) => TypedKind::Classification,
            TypedContent::KeywordList(_) => TypedKind::KeywordList,
        }
    }
}

/// Outcome of a dynamic-schema request.
///
/// A `warning` of `None` means the reply parsed cleanly into `data`. A
/// populated warning means parsing degraded and `data` holds a single
/// `rawText` entry with the cleaned, unparsed reply. Both cases are
/// successes: the caller always receives usable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Extraction {
    /// Whether structure extraction succeeded without degradation
    pub fn is_clean(&self) -> bool {
        self.warning.is_none()
    }
}

/// One notification on a streaming generation.
///
/// Partials arrive in generation order and strictly precede the single
/// `Complete` item; nothing follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamEvent {
    /// An intermediate chunk of generated text
    Partial { delta: String },
    /// Terminal notification carrying the accumulated full text
    Complete { text: String },
}

/// Host-facing serialization of a generation outcome.
///
/// Renders exactly one of:
/// `{"success": true, "data": {...}}`,
/// `{"success": true, "data": {...}, "warning": "..."}`, or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationReply {
    /// Successful outcome
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            warning: None,
            error: None,
        }
    }

    /// Degraded but non-fatal outcome
    pub fn ok_with_warning(data: Value, warning: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            warning: Some(warning.into()),
            error: None,
        }
    }

    /// Capability failure
    pub fn failure(error: &FmError) -> Self {
        Self {
            success: false,
            data: None,
            warning: None,
            error: Some(error.to_string()),
        }
    }

    /// Build a reply from a typed fixed-schema result
    pub fn from_typed(result: Result<TypedContent, FmError>) -> Self {
        match result.and_then(|content| Ok(serde_json::to_value(content)?)) {
            Ok(value) => Self::ok(value),
            Err(err) => Self::failure(&err),
        }
    }
}

impl From<Result<Extraction, FmError>> for GenerationReply {
    fn from(result: Result<Extraction, FmError>) -> Self {
        match result {
            Ok(extraction) => {
                let data = Value::Object(extraction.data);
                match extraction.warning {
                    Some(warning) => Self::ok_with_warning(data, warning),
                    None => Self::ok(data),
                }
            }
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_success_shape() {
        let mut data = Map::new();
        data.insert("rating".to_string(), json!(8));
        let reply = GenerationReply::from(Ok(Extraction {
            data,
            warning: None,
        }));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"success": true, "data": {"rating": 8}})
        );
    }

    #[test]
    fn reply_warning_shape() {
        let mut data = Map::new();
        data.insert("rawText".to_string(), json!("not json"));
        let reply = GenerationReply::from(Ok(Extraction {
            data,
            warning: Some("Could not parse JSON".to_string()),
        }));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "success": true,
                "data": {"rawText": "not json"},
                "warning": "Could not parse JSON"
            })
        );
    }

    #[test]
    fn reply_failure_shape() {
        let reply = GenerationReply::from(Err::<Extraction, _>(FmError::NotEligible));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "success": false,
                "error": "this device is not eligible for Apple Intelligence"
            })
        );
    }

    #[test]
    fn typed_content_uses_caller_facing_keys() {
        let content = TypedContent::ArticleAnalysis(ArticleAnalysis {
            summary: "short".to_string(),
            key_points: vec!["a".to_string()],
            sentiment: Sentiment::Positive,
            categories: vec!["tech".to_string()],
        });
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            json!({
                "summary": "short",
                "keyPoints": ["a"],
                "sentiment": "positive",
                "categories": ["tech"]
            })
        );
    }

    #[test]
    fn typed_kind_decodes_host_json() {
        let value = json!({"keywords": ["rust", "apple"]});
        let content = TypedKind::KeywordList.decode(value).unwrap();
        assert_eq!(content.kind(), TypedKind::KeywordList);
        match content {
            TypedContent::KeywordList(list) => assert_eq!(list.keywords.len(), 2),
            other => panic!("unexpected variant: {:?}", other.kind()),
        }
    }

    #[test]
    fn typed_kind_decode_rejects_mismatched_shape() {
        let value = json!({"contacts": "not a list"});
        let err = TypedKind::ContactList.decode(value).unwrap_err();
        assert!(matches!(err, FmError::Serialization(_)));
    }

    #[test]
    fn availability_maps_to_errors() {
        assert!(Availability::Ready.into_error().is_none());
        assert!(matches!(
            Availability::NotEnabled.into_error(),
            Some(FmError::NotEnabled)
        ));
        assert!(matches!(
            Availability::Unavailable {
                reason: "maintenance".to_string()
            }
            .into_error(),
            Some(FmError::Backend(r)) if r == "maintenance"
        ));
    }
}
