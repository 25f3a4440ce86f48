//! Response resolver — candidate fallback, text extraction, decoding.
//!
//! Per request:
//!
//! ```text
//! Idle → Calling(m0) ─err→ Calling(m1) ─err→ … ─err→ Failed(TransportExhausted)
//!             │ok            │ok
//!             └──────────────┴→ HaveResponse ─┬→ Parsed(Reading)
//!                                             ├→ Failed(EmptyResponse)
//!                                             └→ Failed(MalformedResponse)
//! ```
//!
//! Any `Ok` from the backend ends the candidate walk, even an empty one.
//! A one-element candidate list is the no-fallback behaviour.

use tracing::{debug, info, warn};

use orakle_llm::{GenerateContentRequest, LlmError, ModelBackend, ModelResponse};

use super::error::OracleError;
use super::reading::Reading;

/// Walks an ordered candidate list against a backend.
#[derive(Debug)]
pub struct Resolver<B> {
    backend: B,
    candidates: Vec<String>,
}

impl<B: ModelBackend> Resolver<B> {
    pub fn new(backend: B, candidates: Vec<String>) -> Self {
        Self {
            backend,
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Try each candidate in order; return the first response.
    pub async fn call(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ModelResponse, OracleError> {
        let mut last: Option<LlmError> = None;

        for (attempt, model) in self.candidates.iter().enumerate() {
            debug!(model = %model, attempt, "calling candidate model");
            match self.backend.generate(model, request).await {
                Ok(response) => {
                    info!(model = %model, attempt, "candidate model answered");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(model = %model, attempt, error = %e, "candidate model failed");
                    last = Some(e);
                }
            }
        }

        Err(OracleError::TransportExhausted {
            attempts: self.candidates.len(),
            last,
        })
    }

    /// Call, extract, decode and validate.
    pub async fn resolve(&self, request: &GenerateContentRequest) -> Result<Reading, OracleError> {
        let response = self.call(request).await?;
        let reading = decode_reading(&response)?;
        if !reading.is_valid {
            debug!(model = %response.model, "model rejected the words");
            return Err(OracleError::rejected(reading.error_message));
        }
        Ok(reading)
    }
}

/// Extract text from a response and decode it as a `Reading`.
///
/// Does not check `is_valid`; `Resolver::resolve` does.
pub fn decode_reading(response: &ModelResponse) -> Result<Reading, OracleError> {
    let text = response.extract_text().unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    serde_json::from_str(text).map_err(|e| {
        warn!(model = %response.model, error = %e, "response is not a reading");
        OracleError::MalformedResponse(e)
    })
}
