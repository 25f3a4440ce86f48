//! Error taxonomy for one reading attempt.
//!
//! Every kind displays a single user-facing line. Causes are kept as sources
//! for logging but never shown to the user.

use orakle_llm::LlmError;

/// Shown when the model rejects the words without saying why.
pub const DEFAULT_REJECTION: &str =
    "The orakle only reads the soul. Please provide words that describe your inner self.";

/// Why a reading could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Required API key absent. Detected before any request is built.
    #[error("Missing GEMINI_API_KEY. Add it to .env.local and restart.")]
    Configuration,

    /// The model judged the words not to describe a personality.
    #[error("{0}")]
    ValidationRejected(String),

    /// Every candidate model failed without returning a response.
    #[error("The orakle cannot reach a compatible Gemini model right now. Please try again later.")]
    TransportExhausted {
        attempts: usize,
        #[source]
        last: Option<LlmError>,
    },

    /// A response arrived but carried no text.
    #[error("The orakle is silent. Try again.")]
    EmptyResponse,

    /// The text could not be decoded as a reading.
    #[error("The orakle spoke in riddles. Please try again.")]
    MalformedResponse(#[source] serde_json::Error),
}

impl OracleError {
    /// Rejection carrying the model's message, or the generic one when it gave none.
    pub fn rejected(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
        OracleError::ValidationRejected(message)
    }
}
