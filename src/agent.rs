//! Role-bound agent executing one provider call per pipeline step

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::provider::{excerpt, merge_context};
use crate::types::Role;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Failure class for a contained step error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Model identifier matched no known provider family
    UnsupportedModel,
    /// Transport-level failure before a response arrived
    Network,
    /// Per-call deadline exceeded
    Timeout,
    /// Non-success HTTP status from the provider
    Status,
    /// Response arrived but the expected field was absent
    MalformedResponse,
    /// Failure outside the wire taxonomy
    Internal,
}

/// A failure contained at the agent boundary.
///
/// Carries enough structure for callers and tests to tell genuine model
/// output from a failure without parsing prose; [`StepFailure::token`]
/// renders the transcript form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailure {
    /// Failure class
    pub kind: FailureKind,
    /// Human-readable summary, including status code and body excerpt
    /// for HTTP failures
    pub message: String,
}

impl StepFailure {
    fn from_error(error: &Error) -> Self {
        let kind = match error {
            Error::UnsupportedModel(_) => FailureKind::UnsupportedModel,
            Error::Http(_) => FailureKind::Network,
            Error::Timeout { .. } => FailureKind::Timeout,
            Error::Status { .. } => FailureKind::Status,
            Error::MalformedResponse(_) | Error::Serialization(_) => {
                FailureKind::MalformedResponse
            }
            _ => FailureKind::Internal,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }

    /// Transcript rendering of this failure
    pub fn token(&self, role: Role) -> String {
        format!("[{role}] {}", self.message)
    }
}

/// Structured outcome of one agent step
pub type StepOutcome = std::result::Result<String, StepFailure>;

/// A role's executable binding to one provider
pub struct Agent {
    /// Pipeline position this agent fills
    pub role: Role,
    config: ProviderConfig,
    client: Client,
}

impl Agent {
    /// Bind a role to a provider configuration.
    ///
    /// Validation happens here so credential and parameter problems surface
    /// at construction, before any network call.
    pub fn new(role: Role, config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            role,
            config,
            client,
        })
    }

    /// The provider binding backing this agent
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Execute one provider call, containing failures into the outcome.
    ///
    /// Network, timeout, HTTP-status and decode failures never propagate
    /// past this boundary and are not retried; the structured failure's
    /// token form feeds the transcript when the orchestrator's policy says
    /// to keep going.
    pub async fn run(&self, prompt: &str, context: &BTreeMap<String, Value>) -> StepOutcome {
        match self.call(prompt, context).await {
            Ok(text) => Ok(text),
            Err(error) => {
                warn!(role = %self.role, provider = %self.config.kind, error = %error,
                      "step failure contained");
                Err(StepFailure::from_error(&error))
            }
        }
    }

    async fn call(&self, prompt: &str, context: &BTreeMap<String, Value>) -> Result<String> {
        let adapter = self.config.kind.adapter();
        let effective = merge_context(prompt, context);
        let url = adapter.endpoint(&self.config);
        let body = adapter.encode(&self.config, &effective)?;

        debug!(role = %self.role, provider = %self.config.kind, model = %self.config.model,
               prompt_len = effective.len(), "dispatching provider call");

        let mut request = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .json(&body);
        for (name, value) in adapter.headers(&self.config) {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    secs: self.config.timeout.as_secs(),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: excerpt(&body_text),
            });
        }

        let value: Value = serde_json::from_str(&body_text)
            .map_err(|e| Error::malformed(format!("response body is not JSON: {e}")))?;

        let text = adapter.decode(&value)?;

        debug!(role = %self.role, provider = %self.config.kind, output_len = text.len(),
               "provider call completed");
        Ok(text)
    }
}
