//! Raw HTTP client for the Gemini `generateContent` API.
//!
//! No oracle awareness — just makes API calls via reqwest.

use async_trait::async_trait;
use orakle_config::Settings;
use reqwest::Client;
use tracing::debug;

use super::types::{GenerateContentRequest, GenerateContentResponse, ModelResponse};
use super::ModelBackend;

/// Errors from LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("missing API key: {0}")]
    MissingApiKey(String),
}

/// Raw HTTP client for the Gemini API.
///
/// Built once per process and reused for every call.
#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// Create a client against the default API root.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, orakle_config::DEFAULT_BASE_URL.into())
    }

    /// Create a client with a custom base URL (for testing with mock servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key: Some(api_key),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from process settings.
    ///
    /// A missing key is not an error here; calls fail with `MissingApiKey`
    /// and callers are expected to check `Settings::has_api_key` first.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            http,
            api_key: settings.api_key().map(str::to_string),
            base_url: settings.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a generateContent request for one model.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::MissingApiKey(format!("{} not set", orakle_config::API_KEY_VAR))
        })?;

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!(%url, "sending generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(LlmError::RateLimited { retry_after });
        }

        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(LlmError::ApiError {
                status,
                message: body,
            });
        }

        let resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(resp)
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ModelResponse, LlmError> {
        let wire = self.generate_content(model, request).await?;
        Ok(ModelResponse::from_wire(model, wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response, returning the base URL and a
    /// handle yielding the raw request that was received.
    async fn serve_once(
        status_line: &'static str,
        extra_headers: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            // Read headers, then as much body as Content-Length promises.
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\n{extra_headers}content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest::json_prompt("three words", json!({"type": "OBJECT"}))
    }

    #[test]
    fn client_creation() {
        let client = GeminiClient::new("test-key".into());
        assert_eq!(client.base_url(), "https://generativelanguage.googleapis.com/v1beta");
    }

    #[test]
    fn client_custom_base_url() {
        let client =
            GeminiClient::with_base_url("test-key".into(), "http://localhost:8080/".into());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn missing_key_never_dispatches() {
        let settings = Settings::new(None, vec!["m".into()]).with_base_url("http://127.0.0.1:1");
        let client = GeminiClient::from_settings(&settings).unwrap();
        let err = client.generate_content("m", &request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn successful_call_maps_candidates() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"is_valid\":false}"}]}}]}"#;
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", "", body).await;

        let client = GeminiClient::with_base_url("k-123".into(), base_url);
        let resp = client.generate("gemini-2.5-flash", &request()).await.unwrap();
        assert_eq!(resp.model, "gemini-2.5-flash");
        assert_eq!(resp.extract_text().as_deref(), Some(r#"{"is_valid":false}"#));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /models/gemini-2.5-flash:generateContent"));
        assert!(raw.to_ascii_lowercase().contains("x-goog-api-key: k-123"));
        assert!(raw.contains("\"responseMimeType\":\"application/json\""));
    }

    #[tokio::test]
    async fn api_error_status() {
        let (base_url, _server) = serve_once(
            "HTTP/1.1 404 Not Found",
            "",
            r#"{"error":{"message":"model not found"}}"#,
        )
        .await;

        let client = GeminiClient::with_base_url("k".into(), base_url);
        let err = client.generate_content("nope", &request()).await.unwrap_err();
        match err {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("model not found"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limited_reads_retry_after() {
        let (base_url, _server) =
            serve_once("HTTP/1.1 429 Too Many Requests", "retry-after: 7\r\n", "{}").await;

        let client = GeminiClient::with_base_url("k".into(), base_url);
        let err = client.generate_content("m", &request()).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after: Some(7)
            }
        ));
    }

    #[tokio::test]
    async fn undecodable_body() {
        let (base_url, _server) = serve_once("HTTP/1.1 200 OK", "", "not json").await;

        let client = GeminiClient::with_base_url("k".into(), base_url);
        let err = client.generate_content("m", &request()).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn error_display() {
        let err = LlmError::ApiError {
            status: 401,
            message: "invalid api key".into(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));

        let err = LlmError::RateLimited {
            retry_after: Some(30),
        };
        assert!(err.to_string().contains("rate limited"));

        let err = LlmError::MissingApiKey("GEMINI_API_KEY not set".into());
        assert!(err.to_string().contains("missing API key"));
    }
}
