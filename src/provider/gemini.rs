use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{Provider, StructuredRequest};
use crate::errors::IcpError;
use crate::wire::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};

/// Gemini `generateContent` provider with JSON-mode structured output.
/// No timeout and no retries: a hung call keeps the session generating.
pub struct GeminiProvider {
    model: String,
    api_base: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(model: String, api_base: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { model, api_base, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn send(&self, api_key: &str, req: &StructuredRequest) -> Result<Option<String>, IcpError> {
        let url = self.endpoint();
        let body = GenerateContentRequest::structured(&req.prompt, &req.schema, req.temperature);
        debug!(op = req.operation, %url, "POST generateContent");
        crate::log::dump_json("request", &body);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(op = req.operation, %status, "response received");
        crate::log::dump_raw("response", &text);

        if !status.is_success() {
            return Err(IcpError::Transport(describe_api_error(status, &text)));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| IcpError::Malformed(format!("unreadable service envelope: {e}")))?;
        if let Some(version) = &parsed.model_version {
            debug!(op = req.operation, model_version = %version);
        }
        let text = parsed.text();
        if text.is_none() {
            warn!(
                op = req.operation,
                finish_reason = parsed.finish_reason().unwrap_or("none"),
                "model returned no text"
            );
        }
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Human-readable message for a non-success HTTP answer, preferring the
/// service's own error message when the body carries one.
fn describe_api_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(b) if !b.error.message.is_empty() => {
            if b.error.status.is_empty() {
                format!("{} ({})", b.error.message, status)
            } else {
                format!("{} ({}, {})", b.error.message, status, b.error.status)
            }
        }
        _ if body.trim().is_empty() => format!("service returned {}", status),
        _ => format!("service returned {}: {}", status, body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_model() {
        let p = GeminiProvider::new(
            "gemini-3-flash-preview".into(),
            "https://generativelanguage.googleapis.com/v1beta/".into(),
        )
        .unwrap();
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
        assert_eq!(p.model(), "gemini-3-flash-preview");
    }

    #[test]
    fn api_error_prefers_service_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            describe_api_error(StatusCode::BAD_REQUEST, body),
            "API key not valid. (400 Bad Request, INVALID_ARGUMENT)"
        );
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        assert_eq!(
            describe_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "service returned 502 Bad Gateway: upstream down"
        );
        assert_eq!(
            describe_api_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            "service returned 503 Service Unavailable"
        );
    }
}
