//! Core type definitions for the triad pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a run ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed pipeline position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Drafts the initial deliverable from the task description
    Producer,
    /// Critiques the previous deliverable with concrete suggestions
    Reviewer,
    /// Produces the revised deliverable from draft plus critique
    Specialist,
}

impl Role {
    /// All pipeline roles, in execution order
    pub const ALL: [Role; 3] = [Role::Producer, Role::Reviewer, Role::Specialist];

    /// Role name as used in transcripts and failure tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Producer => "producer",
            Role::Reviewer => "reviewer",
            Role::Specialist => "specialist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of work submitted to the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Natural-language task description
    pub description: String,
    /// Caller-supplied context, merged into every prompt
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}

impl Task {
    /// Create a task, rejecting an empty or whitespace-only description
    pub fn new(description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(Error::invalid_input("task description must not be empty"));
        }
        Ok(Self {
            description,
            context: BTreeMap::new(),
        })
    }

    /// Add one context entry
    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Replace the context map
    pub fn with_context_map(mut self, context: BTreeMap<String, Value>) -> Self {
        self.context = context;
        self
    }
}

/// One pipeline step's recorded output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based position in the transcript, strictly increasing
    pub index: u32,
    /// Role that produced this step
    pub role: Role,
    /// Text produced by the step (a failure token when `recovered`)
    pub output: String,
    /// Whether this step's output is a contained failure token
    pub recovered: bool,
    /// Wall-clock time spent in the step
    pub elapsed_ms: u64,
}

/// Aggregate outcome of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Identifier of this run
    pub run_id: RunId,
    /// Whether the pipeline reached its final round
    pub success: bool,
    /// Final deliverable text; `None` exactly when the run failed
    pub final_text: Option<String>,
    /// Run-level error message; `None` exactly when the run succeeded
    pub error: Option<String>,
    /// Ordered transcript of every executed step
    pub iterations: Vec<IterationRecord>,
    /// Roles provisioned for the run (always all three)
    pub roles_used: Vec<Role>,
    /// Total wall-clock time for the run
    pub elapsed_ms: u64,
}

impl OrchestrationResult {
    /// Build the success outcome for a completed pipeline
    pub fn completed(
        run_id: RunId,
        final_text: String,
        iterations: Vec<IterationRecord>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            run_id,
            success: true,
            final_text: Some(final_text),
            error: None,
            iterations,
            roles_used: Role::ALL.to_vec(),
            elapsed_ms,
        }
    }

    /// Build the failure outcome for a run that aborted before completion
    pub fn failed(run_id: RunId, error: &Error, elapsed_ms: u64) -> Self {
        Self {
            run_id,
            success: false,
            final_text: None,
            error: Some(error.to_string()),
            iterations: Vec::new(),
            roles_used: Role::ALL.to_vec(),
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_rejects_empty_description() {
        assert!(matches!(Task::new(""), Err(Error::InvalidInput(_))));
        assert!(matches!(Task::new("   \n\t"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_task_with_context() {
        let task = Task::new("Write a launch announcement for product X")
            .unwrap()
            .with_context("client", json!("X"));

        assert_eq!(task.context.get("client"), Some(&json!("X")));
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in Role::ALL {
            let serialized = serde_json::to_string(&role).unwrap();
            assert_eq!(serialized, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_completed_result_lists_all_roles() {
        let result =
            OrchestrationResult::completed(RunId::new(), "final".to_string(), Vec::new(), 0);

        assert!(result.success);
        assert_eq!(result.final_text.as_deref(), Some("final"));
        assert!(result.error.is_none());
        assert_eq!(result.roles_used, Role::ALL.to_vec());
    }

    #[test]
    fn test_failed_result_carries_error_only() {
        let result =
            OrchestrationResult::failed(RunId::new(), &Error::invalid_input("empty task"), 0);

        assert!(!result.success);
        assert!(result.final_text.is_none());
        assert_eq!(result.error.as_deref(), Some("invalid input: empty task"));
    }
}
