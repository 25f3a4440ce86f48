//! Rust types for the Gemini `generateContent` API, plus the
//! provider-agnostic `ModelResponse` the resolver consumes.
//!
//! Wire types are serde-serializable to JSON. `ModelResponse` can expose its
//! text three ways; `TextShape` tries them in a fixed order.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Request ──

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A single user turn with JSON-constrained output.
    pub fn json_prompt(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(schema),
                temperature: None,
            }),
        }
    }
}

/// Structured-output and sampling knobs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// One turn of content. Shared by request and response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![Part::text(text)],
        }
    }
}

/// A content part. Only text is modelled; other kinds deserialize with `text: None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

// ── Response (wire) ──

/// Response body from `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub model_version: Option<String>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// A candidate whose content is the given text parts, in order.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: Some(Content {
                role: Some("model".into()),
                parts: parts.into_iter().map(Part::text).collect(),
            }),
            finish_reason: None,
        }
    }
}

/// Token usage from the API response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

// ── Provider-agnostic response ──

/// Zero-argument text accessor.
pub type TextAccessor = Arc<dyn Fn() -> String + Send + Sync>;

/// What a backend hands back for one model call.
///
/// Providers expose text differently: as a plain field, behind an accessor,
/// or only as candidate content parts. Any combination may be set.
#[derive(Clone, Default)]
pub struct ModelResponse {
    /// Model that produced the response.
    pub model: String,
    pub text: Option<String>,
    pub text_accessor: Option<TextAccessor>,
    pub candidates: Vec<Candidate>,
    pub usage: Option<UsageMetadata>,
}

impl ModelResponse {
    /// Response exposing its text as a plain field.
    pub fn with_text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Response exposing its text through an accessor.
    pub fn with_accessor<F>(model: impl Into<String>, accessor: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            model: model.into(),
            text_accessor: Some(Arc::new(accessor)),
            ..Self::default()
        }
    }

    /// Response exposing its text only through candidates.
    pub fn with_candidates(model: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            model: model.into(),
            candidates,
            ..Self::default()
        }
    }

    /// Convert a wire response. The REST API only ever populates candidates.
    pub fn from_wire(model: &str, wire: GenerateContentResponse) -> Self {
        Self {
            model: wire.model_version.unwrap_or_else(|| model.to_string()),
            text: None,
            text_accessor: None,
            candidates: wire.candidates,
            usage: wire.usage_metadata,
        }
    }

    /// Extract the raw text, trying each shape in `EXTRACTION_ORDER`.
    ///
    /// The first shape present decides; a present-but-empty field is returned
    /// as-is rather than falling through.
    pub fn extract_text(&self) -> Option<String> {
        EXTRACTION_ORDER.iter().find_map(|shape| shape.extract(self))
    }
}

impl fmt::Debug for ModelResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelResponse")
            .field("model", &self.model)
            .field("text", &self.text)
            .field("text_accessor", &self.text_accessor.as_ref().map(|_| "<fn>"))
            .field("candidates", &self.candidates)
            .field("usage", &self.usage)
            .finish()
    }
}

/// One way a response can carry its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextShape {
    /// Plain `text` field.
    Field,
    /// Zero-argument accessor.
    Accessor,
    /// First candidate's content parts, joined with newlines.
    Parts,
}

/// Fixed priority for text extraction.
pub const EXTRACTION_ORDER: [TextShape; 3] =
    [TextShape::Field, TextShape::Accessor, TextShape::Parts];

impl TextShape {
    /// Extract text via this shape, or `None` if the response doesn't use it.
    pub fn extract(self, response: &ModelResponse) -> Option<String> {
        match self {
            TextShape::Field => response.text.clone(),
            TextShape::Accessor => response.text_accessor.as_ref().map(|f| f()),
            TextShape::Parts => {
                let content = response.candidates.first()?.content.as_ref()?;
                let joined = content
                    .parts
                    .iter()
                    .map(|p| p.text.as_deref().unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join("\n");
                if joined.is_empty() {
                    None
                } else {
                    Some(joined)
                }
            }
        }
    }
}

impl fmt::Display for TextShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextShape::Field => write!(f, "field"),
            TextShape::Accessor => write!(f, "accessor"),
            TextShape::Parts => write!(f, "parts"),
        }
    }
}
