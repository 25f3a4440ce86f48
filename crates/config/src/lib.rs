//! Settings — process-scoped model and provider configuration.
//!
//! Built once at startup, then shared (usually behind an `Arc`) with the
//! Gemini client and the oracle. Layers, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. Optional YAML file
//! 3. Environment (`GEMINI_API_KEY`, `GEMINI_MODEL`)
//!
//! CLI overrides are applied by the binary on top of the result.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable overriding the primary candidate model.
pub const MODEL_VAR: &str = "GEMINI_MODEL";

/// Default Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default candidate models, tried in order.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-flash-latest",
    "gemini-2.5-flash",
    "gemini-pro-latest",
    "gemini-2.5-pro",
];

/// Default transport timeout per model call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no candidate models configured")]
    NoModels,
}

/// On-disk YAML shape. Every key is optional.
///
/// ```yaml
/// base_url: https://generativelanguage.googleapis.com/v1beta
/// models: [gemini-flash-latest, gemini-2.5-pro]
/// fallback: true
/// timeout_secs: 60
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: String,
    pub models: Vec<String>,
    pub fallback: bool,
    pub timeout_secs: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            fallback: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FileConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Read and parse a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved settings for one process.
#[derive(Clone)]
pub struct Settings {
    api_key: Option<String>,
    base_url: String,
    models: Vec<String>,
    fallback: bool,
    timeout: Duration,
}

impl Settings {
    /// Defaults plus the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(FileConfig::default(), |key| std::env::var(key).ok())
    }

    /// Optional YAML file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => {
                debug!(path = %p.display(), "loading config file");
                FileConfig::load(p)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Layer an environment lookup over a file config.
    ///
    /// `lookup` stands in for `std::env::var` so callers (and tests) can
    /// supply the environment explicitly.
    pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let mut models: Vec<String> = file
            .models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        if let Some(primary) = lookup(MODEL_VAR)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
        {
            match models.first_mut() {
                Some(first) => *first = primary,
                None => models.push(primary),
            }
        }

        if !file.fallback {
            models.truncate(1);
        }
        if models.is_empty() {
            return Err(ConfigError::NoModels);
        }

        Ok(Self {
            api_key,
            base_url: file.base_url.trim_end_matches('/').to_string(),
            models,
            fallback: file.fallback,
            timeout: Duration::from_secs(file.timeout_secs),
        })
    }

    /// Settings with an explicit key and candidate list (tests, embedding).
    pub fn new(api_key: Option<String>, models: Vec<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            models,
            fallback: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Replace the candidate list. Empty input is ignored. With fallback
    /// off only the first entry is kept.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        if !models.is_empty() {
            self.models = models;
            if !self.fallback {
                self.models.truncate(1);
            }
        }
        self
    }

    /// Keep only the primary candidate and turn fallback off.
    pub fn single_model(mut self) -> Self {
        self.fallback = false;
        self.models.truncate(1);
        self
    }

    /// Whether candidates past the first are tried.
    pub fn fallback(&self) -> bool {
        self.fallback
    }

    /// Point the client at a different API root (mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Candidate models in priority order. Never empty when built via `resolve`.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("fallback", &self.fallback)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let settings = Settings::resolve(FileConfig::default(), env(&[])).unwrap();
        assert!(!settings.has_api_key());
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
        assert_eq!(settings.models().len(), 4);
        assert_eq!(settings.models()[0], "gemini-flash-latest");
        assert_eq!(settings.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn api_key_from_env() {
        let settings =
            Settings::resolve(FileConfig::default(), env(&[(API_KEY_VAR, "secret")])).unwrap();
        assert_eq!(settings.api_key(), Some("secret"));
    }

    #[test]
    fn blank_api_key_is_absent() {
        let settings =
            Settings::resolve(FileConfig::default(), env(&[(API_KEY_VAR, "   ")])).unwrap();
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn model_env_replaces_primary_only() {
        let settings =
            Settings::resolve(FileConfig::default(), env(&[(MODEL_VAR, "gemini-custom")]))
                .unwrap();
        assert_eq!(settings.models()[0], "gemini-custom");
        assert_eq!(settings.models()[1], "gemini-2.5-flash");
        assert_eq!(settings.models().len(), 4);
    }

    #[test]
    fn fallback_disabled_keeps_one_candidate() {
        let file = FileConfig {
            fallback: false,
            ..FileConfig::default()
        };
        let settings = Settings::resolve(file, env(&[(MODEL_VAR, "gemini-3-flash-preview")]))
            .unwrap();
        assert_eq!(settings.models(), ["gemini-3-flash-preview".to_string()]);
    }

    #[test]
    fn replaced_models_respect_disabled_fallback() {
        let file = FileConfig {
            fallback: false,
            ..FileConfig::default()
        };
        let settings = Settings::resolve(file, env(&[]))
            .unwrap()
            .with_models(vec!["gemini-2.5-pro".into(), "gemini-2.5-flash".into()]);
        assert!(!settings.fallback());
        assert_eq!(settings.models(), ["gemini-2.5-pro".to_string()]);
    }

    #[test]
    fn replaced_models_keep_fallback_when_enabled() {
        let settings = Settings::resolve(FileConfig::default(), env(&[]))
            .unwrap()
            .with_models(vec!["a".into(), "b".into()]);
        assert!(settings.fallback());
        assert_eq!(settings.models().len(), 2);

        let single = settings.single_model();
        assert!(!single.fallback());
        assert_eq!(single.with_models(vec!["c".into(), "d".into()]).models(), ["c".to_string()]);
    }

    #[test]
    fn empty_model_list_is_an_error() {
        let file = FileConfig {
            models: vec![" ".into()],
            ..FileConfig::default()
        };
        let err = Settings::resolve(file, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoModels));
    }

    #[test]
    fn empty_list_rescued_by_model_env() {
        let file = FileConfig {
            models: vec![],
            ..FileConfig::default()
        };
        let settings = Settings::resolve(file, env(&[(MODEL_VAR, "gemini-2.5-pro")])).unwrap();
        assert_eq!(settings.models(), ["gemini-2.5-pro".to_string()]);
    }

    #[test]
    fn yaml_partial_keys() {
        let file = FileConfig::from_yaml("models: [a, b]\ntimeout_secs: 5\n").unwrap();
        assert_eq!(file.models, vec!["a", "b"]);
        assert_eq!(file.timeout_secs, 5);
        assert!(file.fallback);
        assert_eq!(file.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn yaml_unknown_key_rejected() {
        assert!(FileConfig::from_yaml("modles: [a]\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://localhost:9999/\nmodels: [only-one]").unwrap();

        let settings = Settings::resolve(FileConfig::load(file.path()).unwrap(), env(&[]))
            .unwrap();
        assert_eq!(settings.base_url(), "http://localhost:9999");
        assert_eq!(settings.models(), ["only-one".to_string()]);
    }

    #[test]
    fn load_missing_file() {
        let err = FileConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn builder_overrides() {
        let settings = Settings::new(Some("k".into()), vec!["a".into(), "b".into()])
            .with_models(vec![])
            .single_model()
            .with_base_url("http://127.0.0.1:1/");
        assert_eq!(settings.models(), ["a".to_string()]);
        assert_eq!(settings.base_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn debug_redacts_key() {
        let settings = Settings::new(Some("super-secret".into()), vec!["m".into()]);
        let dbg = format!("{settings:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
