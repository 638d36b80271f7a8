//! Wire types for the supported text-generation APIs.
//!
//! Each provider has its own request/response shapes; both responses
//! normalize into [`Generation`] so the gateway reads one thing.

use serde::{Deserialize, Serialize};

/// What the gateway asks a provider for.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub content: String,
    pub system_prompt: String,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Provider response, normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub candidates: Vec<Candidate>,
    /// Set when the prompt itself was refused.
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<String>,
    pub finish_reason: Option<String>,
}

impl Generation {
    /// Text of the first candidate's first part.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates.first()?.parts.first().map(String::as_str)
    }

    /// Why the provider stopped, for reporting an empty answer.
    pub fn stop_reason(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .or_else(|| self.block_reason.clone())
            .unwrap_or_else(|| "unknown".into())
    }
}

/// Pull a readable message out of an error body.
///
/// Takes `error.message` (or a top-level `message`) from a JSON body. When
/// that message is itself JSON, one more level is unwrapped. Anything that
/// isn't JSON comes back trimmed.
pub fn extract_error_message(body: &str) -> String {
    match nested_message(body) {
        Some(message) => nested_message(&message).unwrap_or(message),
        None => body.trim().to_string(),
    }
}

fn nested_message(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

// ── Gemini generateContent ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(req: &GenerationRequest) -> Self {
        let generation_config = if req.max_output_tokens.is_some() || req.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: req.max_output_tokens,
                temperature: req.temperature,
            })
        } else {
            None
        };
        Self {
            contents: vec![Content::text(Some("user"), &req.content)],
            system_instruction: Some(Content::text(None, &req.system_prompt)),
            generation_config,
        }
    }
}

impl From<GenerateContentResponse> for Generation {
    fn from(resp: GenerateContentResponse) -> Self {
        Self {
            candidates: resp
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    parts: c
                        .content
                        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                        .unwrap_or_default(),
                    finish_reason: c.finish_reason,
                })
                .collect(),
            block_reason: resp.prompt_feedback.and_then(|f| f.block_reason),
        }
    }
}

// ── OpenAI-compatible chat completions ──

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatMessage>,
    pub finish_reason: Option<String>,
}

impl From<&GenerationRequest> for ChatRequest {
    fn from(req: &GenerationRequest) -> Self {
        Self {
            model: req.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: Some(req.system_prompt.clone()),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Some(req.content.clone()),
                },
            ],
            max_tokens: req.max_output_tokens,
            temperature: req.temperature,
        }
    }
}

impl From<ChatResponse> for Generation {
    fn from(resp: ChatResponse) -> Self {
        Self {
            candidates: resp
                .choices
                .into_iter()
                .map(|c| Candidate {
                    parts: c
                        .message
                        .and_then(|m| m.content)
                        .filter(|t| !t.is_empty())
                        .into_iter()
                        .collect(),
                    finish_reason: c.finish_reason,
                })
                .collect(),
            block_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.0-flash".into(),
            content: "Teh cat sat.".into(),
            system_prompt: "Fix spelling.".into(),
            max_output_tokens: Some(2000),
            temperature: None,
        }
    }

    #[test]
    fn gemini_request_serializes_camel_case() {
        let body = GenerateContentRequest::from(&request());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Teh cat sat.");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Fix spelling.");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2000);
        // temperature is None → should be skipped
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn gemini_response_normalizes() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "The cat sat."}]}, "finishReason": "STOP"}
            ]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let generation = Generation::from(resp);
        assert_eq!(generation.first_text(), Some("The cat sat."));
        assert_eq!(generation.stop_reason(), "STOP");
    }

    #[test]
    fn gemini_blocked_prompt_has_reason() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let generation = Generation::from(resp);
        assert_eq!(generation.first_text(), None);
        assert_eq!(generation.stop_reason(), "SAFETY");
    }

    #[test]
    fn gemini_candidate_without_content() {
        let raw = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let generation = Generation::from(resp);
        assert_eq!(generation.first_text(), None);
        assert_eq!(generation.stop_reason(), "MAX_TOKENS");
    }

    #[test]
    fn chat_request_has_system_then_user() {
        let body = ChatRequest::from(&request());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gemini-2.0-flash");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Teh cat sat.");
        assert_eq!(json["max_tokens"], 2000);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn chat_response_normalizes() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "Done."}, "finish_reason": "stop"}]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        let generation = Generation::from(resp);
        assert_eq!(generation.first_text(), Some("Done."));

        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]}"#;
        let generation = Generation::from(serde_json::from_str::<ChatResponse>(raw).unwrap());
        assert_eq!(generation.first_text(), None);
        assert_eq!(generation.stop_reason(), "length");
    }

    #[test]
    fn no_candidates_reason_is_unknown() {
        assert_eq!(Generation::default().stop_reason(), "unknown");
    }

    #[test]
    fn error_message_from_json_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(body), "API key not valid.");
    }

    #[test]
    fn error_message_unwraps_one_nested_level() {
        let inner = r#"{"error": {"message": "quota exceeded"}}"#;
        let body = serde_json::json!({"error": {"message": inner}}).to_string();
        assert_eq!(extract_error_message(&body), "quota exceeded");
    }

    #[test]
    fn error_message_plain_text_passthrough() {
        assert_eq!(extract_error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(extract_error_message(r#"{"detail": "x"}"#), r#"{"detail": "x"}"#);
    }
}
