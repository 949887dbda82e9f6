//! Provider abstraction layer
//!
//! Normalizes the three supported wire protocols behind one adapter
//! contract. Adapters are pure: `encode` and `decode` never touch the
//! network, so a given `(prompt, context)` pair always produces the same
//! request body.

pub mod claude;
pub mod gemini;
pub mod openai;

use crate::config::ProviderConfig;
use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Wire-protocol adapter for one provider family
pub trait ProviderAdapter: Send + Sync {
    /// Full request URL for this binding
    fn endpoint(&self, config: &ProviderConfig) -> String;

    /// Request headers carrying the credential and protocol version
    fn headers(&self, config: &ProviderConfig) -> Vec<(&'static str, String)>;

    /// Build the JSON request body for an effective prompt
    fn encode(&self, config: &ProviderConfig, prompt: &str) -> Result<Value>;

    /// Extract the generated text from a provider response
    fn decode(&self, response: &Value) -> Result<String>;
}

/// Prepend a canonically serialized context block to the prompt.
///
/// Runs before any provider-specific encoding, so all three adapters see an
/// identical effective prompt. The `BTreeMap` keeps key order stable and
/// `serde_json` sorts nested object keys, so the result is deterministic.
pub fn merge_context(prompt: &str, context: &BTreeMap<String, Value>) -> String {
    if context.is_empty() {
        return prompt.to_string();
    }

    let mut merged = String::from("Context:\n");
    for (key, value) in context {
        merged.push_str(&format!("  {key}: {value}\n"));
    }
    merged.push('\n');
    merged.push_str(prompt);
    merged
}

/// Truncate a response body for inclusion in an error message
pub(crate) fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
