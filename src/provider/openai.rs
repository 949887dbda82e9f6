//! OpenAI-family chat-completions adapter

use super::ProviderAdapter;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Adapter for the openai-family `{base}/chat/completions` endpoint
pub struct OpenAiAdapter;

/// Request body for the chat-completions API
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
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

/// Response body for the chat-completions API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ProviderAdapter for OpenAiAdapter {
    fn endpoint(&self, config: &ProviderConfig) -> String {
        format!(
            "{}/chat/completions",
            config.base_url.as_str().trim_end_matches('/')
        )
    }

    fn headers(&self, config: &ProviderConfig) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {}", config.api_key()))]
    }

    fn encode(&self, config: &ProviderConfig, prompt: &str) -> Result<Value> {
        let request = ChatRequest {
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
        let parsed: ChatResponse = serde_json::from_value(response.clone())
            .map_err(|e| Error::malformed(format!("openai response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::malformed("openai response missing first choice content"))
    }
}
