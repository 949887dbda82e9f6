//! Claude-family Messages API adapter

use super::ProviderAdapter;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Adapter for the claude-family `{base}/messages` endpoint
pub struct ClaudeAdapter;

/// Request body for the Messages API
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body for the Messages API
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl ProviderAdapter for ClaudeAdapter {
    fn endpoint(&self, config: &ProviderConfig) -> String {
        format!("{}/messages", config.base_url.as_str().trim_end_matches('/'))
    }

    fn headers(&self, config: &ProviderConfig) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", config.api_key().to_string()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ]
    }

    fn encode(&self, config: &ProviderConfig, prompt: &str) -> Result<Value> {
        let request = MessagesRequest {
            model: &config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
        };
        Ok(serde_json::to_value(request)?)
    }

    fn decode(&self, response: &Value) -> Result<String> {
        let parsed: MessagesResponse = serde_json::from_value(response.clone())
            .map_err(|e| Error::malformed(format!("claude response: {e}")))?;

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| Error::malformed("claude response missing first content block text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use serde_json::json;
    use url::Url;

    fn config() -> ProviderConfig {
        ProviderConfig::new(
            ProviderKind::Claude,
            "claude-sonnet-4",
            Url::parse("https://api.anthropic.com/v1").unwrap(),
            "claude-key",
        )
        .with_max_tokens(512)
        .with_temperature(0.5)
    }

    #[test]
    fn test_endpoint_appends_messages() {
        assert_eq!(
            ClaudeAdapter.endpoint(&config()),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn test_headers_carry_key_and_version() {
        let headers = ClaudeAdapter.headers(&config());
        assert!(headers.contains(&("x-api-key", "claude-key".to_string())));
        assert!(headers.contains(&("anthropic-version", ANTHROPIC_VERSION.to_string())));
    }

    #[test]
    fn test_encode_places_parameters_at_top_level() {
        let body = ClaudeAdapter.encode(&config(), "draft it").unwrap();

        assert_eq!(body["model"], "claude-sonnet-4");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "draft it");
    }

    #[test]
    fn test_decode_reads_first_content_block() {
        let response = json!({
            "id": "msg_01",
            "content": [{"type": "text", "text": "the draft"}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        assert_eq!(ClaudeAdapter.decode(&response).unwrap(), "the draft");
    }

    #[test]
    fn test_decode_missing_text_is_malformed() {
        let response = json!({"content": []});
        assert!(matches!(
            ClaudeAdapter.decode(&response),
            Err(Error::MalformedResponse(_))
        ));

        let response = json!({"unexpected": true});
        assert!(matches!(
            ClaudeAdapter.decode(&response),
            Err(Error::MalformedResponse(_))
        ));
    }
}
