//! Gemini client for orakle.
//!
//! `GeminiClient` speaks the REST API. The oracle never talks to it directly;
//! it goes through `ModelBackend`, so tests can swap in fakes.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::{GeminiClient, LlmError};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerationConfig, ModelResponse, Part,
    TextAccessor, TextShape, UsageMetadata, EXTRACTION_ORDER,
};

/// Anything that can run one generation request against a named model.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Run `request` against `model`. Any returned `Ok` counts as a response,
    /// whatever its content.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ModelResponse, LlmError>;
}

