//! Gemini-family generateContent adapter
//!
//! Gemini differs from the other two families on every axis that matters
//! here: the model id lives in the endpoint path instead of the body, the
//! credential travels as a URL query parameter instead of a header, and
//! generation parameters sit under a camelCase `generationConfig` object.

use super::ProviderAdapter;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Adapter for the gemini-family `{base}/{model}:generateContent` endpoint
pub struct GeminiAdapter;

/// Request body for the generateContent API
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

/// Response body for the generateContent API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl ProviderAdapter for GeminiAdapter {
    fn endpoint(&self, config: &ProviderConfig) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            config.base_url.as_str().trim_end_matches('/'),
            config.model,
            config.api_key()
        )
    }

    // The credential is a query parameter, so no auth headers are sent.
    fn headers(&self, _config: &ProviderConfig) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn encode(&self, config: &ProviderConfig, prompt: &str) -> Result<Value> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: config.max_tokens,
                temperature: config.temperature,
            },
        };
        Ok(serde_json::to_value(request)?)
    }

    fn decode(&self, response: &Value) -> Result<String> {
        let parsed: GenerateResponse = serde_json::from_value(response.clone())
            .map_err(|e| Error::malformed(format!("gemini response: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| Error::malformed("gemini response missing first candidate part text"))
    }
}
