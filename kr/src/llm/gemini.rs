//! Google Gemini API client implementation
//!
//! Speaks the `generateContent` endpoint of the Generative Language API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::client::{check_status, transport_error};
use super::{
    ClientSettings, CompletionRequest, CompletionResponse, LlmClient, LlmError, RetryPolicy, Role, StopReason,
    TokenUsage,
};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Create a new client from resolved settings
    pub fn new(settings: &ClientSettings) -> Result<Self, LlmError> {
        debug!(model = %settings.model, base_url = %settings.base_url, "GeminiClient::new: called");
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: settings.max_tokens,
            timeout: settings.timeout,
            retry: RetryPolicy::default(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the generateContent API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let contents: Vec<_> = request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": msg.content }],
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            },
        });

        if !request.system_prompt.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": request.system_prompt }],
            });
        }

        body
    }

    /// Parse the API response, concatenating the first candidate's text parts
    fn parse_response(&self, api_response: GeminiResponse) -> CompletionResponse {
        debug!(candidates = api_response.candidates.len(), "parse_response: called");
        let candidate = api_response.candidates.into_iter().next();

        let stop_reason = candidate
            .as_ref()
            .and_then(|c| c.finish_reason.as_deref())
            .map(StopReason::from_gemini)
            .unwrap_or(StopReason::EndTurn);

        let text: String = candidate
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = api_response.usage_metadata.unwrap_or_default();

        CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            stop_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        }
    }

    async fn send_once(&self, url: &str, body: &serde_json::Value) -> Result<GeminiResponse, LlmError> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let response = check_status(response).await?;
        response.json().await.map_err(|e| transport_error(e, self.timeout))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let url = self.endpoint();
        let body = self.build_request_body(&request);

        let api_response = self.retry.run("gemini", || self.send_once(&url, &body)).await?;
        debug!("complete: success");
        Ok(self.parse_response(api_response))
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn client() -> GeminiClient {
        GeminiClient::new(&ClientSettings {
            model: "gemini-2.0-flash".to_string(),
            api_key: "test-key".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 2048,
            timeout: Duration::from_secs(30),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_body() {
        let request = CompletionRequest {
            system_prompt: "You are a productivity assistant.".to_string(),
            messages: vec![Message::user("Break it down"), Message::assistant("[]")],
            max_tokens: 9000,
        };
        let body = client().build_request_body(&request);

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Break it down");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a productivity assistant."
        );
    }

    #[test]
    fn test_build_request_body_without_system_prompt() {
        let body = client().build_request_body(&CompletionRequest::single("", "hi", 100));
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_response_concatenates_parts() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```json\n[\"a\","}, {"text": " \"b\"]\n```"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 9, "totalTokenCount": 49}
        });
        let api_response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let response = client().parse_response(api_response);

        assert_eq!(response.content.as_deref(), Some("```json\n[\"a\", \"b\"]\n```"));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.input_tokens, 40);
        assert_eq!(response.usage.output_tokens, 9);
    }

    #[test]
    fn test_parse_response_no_candidates() {
        let raw = serde_json::json!({ "promptFeedback": {"blockReason": "SAFETY"} });
        let api_response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let response = client().parse_response(api_response);

        assert!(response.content.is_none());
        assert_eq!(response.usage, TokenUsage::default());
    }
}
