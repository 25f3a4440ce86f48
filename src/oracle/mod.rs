//! Oracle — the one operation the front end needs: words in, reading out.
//!
//! ## Architecture
//!
//! - `reading`: `Query` (three normalized words) and `Reading` (model output)
//! - `prompt`: instruction text, coin pool, structured-output schema
//! - `resolver`: candidate-model fallback, text extraction, decoding
//! - `error`: `OracleError`, one user-facing message per failure kind

pub mod error;
pub mod prompt;
pub mod reading;
pub mod resolver;

use std::sync::Arc;

use tracing::debug;

use orakle_config::Settings;
use orakle_llm::{GeminiClient, ModelBackend};

pub use error::OracleError;
pub use reading::{Query, QueryError, Reading};
pub use resolver::Resolver;

/// Settings plus a resolver. Built once, reused for every reading.
#[derive(Debug)]
pub struct Oracle<B = GeminiClient> {
    settings: Arc<Settings>,
    resolver: Resolver<B>,
}

impl Oracle<GeminiClient> {
    /// Build the production oracle around a Gemini client.
    ///
    /// A missing API key does not fail here; it surfaces as
    /// `OracleError::Configuration` on the first reading.
    pub fn from_settings(settings: Arc<Settings>) -> Result<Self, orakle_llm::LlmError> {
        let client = GeminiClient::from_settings(&settings)?;
        Ok(Self::new(settings, client))
    }
}

impl<B: ModelBackend> Oracle<B> {
    /// Build an oracle over any backend, using the settings' candidate list.
    pub fn new(settings: Arc<Settings>, backend: B) -> Self {
        let resolver = Resolver::new(backend, settings.models().to_vec());
        Self { settings, resolver }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolver(&self) -> &Resolver<B> {
        &self.resolver
    }

    /// Produce a valid reading for `query`, or the reason there is none.
    ///
    /// The API key is checked before anything is built or sent.
    pub async fn get_reading(&self, query: &Query) -> Result<Reading, OracleError> {
        if !self.settings.has_api_key() {
            return Err(OracleError::Configuration);
        }

        let request = prompt::build_request(query);
        debug!(words = ?query.words(), candidates = self.resolver.candidates().len(), "requesting reading");
        self.resolver.resolve(&request).await
    }
}
