//! Query and Reading — the input triple and the structured result.

use serde::{Deserialize, Deserializer, Serialize};

/// Longest word the oracle accepts, in characters.
pub const MAX_WORD_LEN: usize = 20;

/// Cut a raw word to `MAX_WORD_LEN` characters, then trim.
pub fn normalize_word(raw: &str) -> String {
    let capped: String = raw.chars().take(MAX_WORD_LEN).collect();
    capped.trim().to_string()
}

/// Errors from building a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("word {} is empty", .0 + 1)]
    EmptyWord(usize),
}

/// Three normalized, non-empty words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    words: [String; 3],
}

impl Query {
    /// Normalize each word and reject the triple if any ends up empty.
    pub fn new<S: AsRef<str>>(words: [S; 3]) -> Result<Self, QueryError> {
        let words = words.map(|w| normalize_word(w.as_ref()));
        if let Some(idx) = words.iter().position(|w| w.is_empty()) {
            return Err(QueryError::EmptyWord(idx));
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[String; 3] {
        &self.words
    }
}

/// Missing and `null` both decode to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The model's structured answer.
///
/// Only `is_valid` is mandatory on the wire; a model that omits `ticker` or
/// sends `"traits": null` yields empty defaults rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub coin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ticker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verdict: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traits: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uncomfortable_truth: String,
}
