use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ========================================
/// generateContent request/response wire protocol
/// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig<'a> {
    pub response_mime_type: &'static str,
    pub response_json_schema: &'a Value,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig<'a>,
}

impl<'a> GenerateContentRequest<'a> {
    /// Single user turn carrying the prompt, JSON output constrained by `schema`.
    pub fn structured(prompt: &str, schema: &'a Value, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: prompt.to_string() }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_json_schema: schema,
                temperature,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate; `None` when there is none
    /// or it is blank.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why the first candidate stopped, e.g. `SAFETY` or `MAX_TOKENS`.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::refinement_schema;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let schema = refinement_schema();
        let req = GenerateContentRequest::structured("rewrite it", &schema, 0.4);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][0]["parts"][0]["text"], "rewrite it");
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(v["generationConfig"]["responseJsonSchema"]["type"], "object");
        assert!(v["generationConfig"].get("responseSchema").is_none());
        assert!((v["generationConfig"]["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "{\"subject\":" }, { "text": "\"x\"}" }] },
                  "finishReason": "STOP" }
            ],
            "modelVersion": "gemini-3-flash-preview"
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("{\"subject\":\"x\"}"));
        assert_eq!(resp.finish_reason(), Some("STOP"));
    }

    #[test]
    fn blocked_or_empty_candidates_have_no_text() {
        let none: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap();
        assert_eq!(none.text(), None);
        assert_eq!(none.finish_reason(), None);

        let blank: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] }, "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert_eq!(blank.text(), None);
        assert_eq!(blank.finish_reason(), Some("SAFETY"));
    }

    #[test]
    fn error_body_parses() {
        let e: ApiErrorBody = serde_json::from_value(json!({
            "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
        }))
        .unwrap();
        assert_eq!(e.error.message, "API key not valid");
        assert_eq!(e.error.status, "PERMISSION_DENIED");
    }
}
