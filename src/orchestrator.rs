//! Fixed three-role iterative refinement controller
//!
//! One run is strictly sequential: the producer drafts, then each
//! refinement round sends the previous output through the reviewer and
//! feeds the critique to the specialist, whose output seeds the next
//! round. Concurrent runs share only the read-only agent bindings.

use crate::agent::Agent;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::prompts::{improve_prompt, review_prompt};
use crate::types::{IterationRecord, OrchestrationResult, Role, RunId, Task};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Upper bound on requested refinement iterations
pub const MAX_ITERATIONS: u32 = 10;

/// What to do when a step fails inside the containment boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Failure tokens flow into later prompts like genuine output
    #[default]
    PropagateAsText,
    /// The first contained failure fails the whole run
    AbortOnFailure,
}

/// Drives the producer → (reviewer → specialist)* pipeline
pub struct Orchestrator {
    producer: Agent,
    reviewer: Agent,
    specialist: Agent,
    policy: RecoveryPolicy,
}

impl Orchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Build the three role bindings from `TRIAD_PRODUCER_*`,
    /// `TRIAD_REVIEWER_*` and `TRIAD_SPECIALIST_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder()
            .producer(Agent::new(
                Role::Producer,
                ProviderConfig::from_env("TRIAD_PRODUCER")?,
            )?)
            .reviewer(Agent::new(
                Role::Reviewer,
                ProviderConfig::from_env("TRIAD_REVIEWER")?,
            )?)
            .specialist(Agent::new(
                Role::Specialist,
                ProviderConfig::from_env("TRIAD_SPECIALIST")?,
            )?)
            .build()
    }

    /// Run the pipeline for the given task.
    ///
    /// Never returns an error: run-level failures (invalid input, escalated
    /// step failures) are encoded in the result so the hosting boundary
    /// always gets a structured payload.
    pub async fn run(&self, task: Task, iterations: u32) -> OrchestrationResult {
        let run_id = RunId::new();
        let started = Instant::now();
        debug!(run_id = %run_id, iterations, "orchestration run starting");

        match self.execute(&task, iterations).await {
            Ok((final_text, records)) => {
                info!(run_id = %run_id, steps = records.len(), "orchestration run completed");
                OrchestrationResult::completed(
                    run_id,
                    final_text,
                    records,
                    started.elapsed().as_millis() as u64,
                )
            }
            Err(error) => {
                warn!(run_id = %run_id, error = %error, "orchestration run failed");
                OrchestrationResult::failed(run_id, &error, started.elapsed().as_millis() as u64)
            }
        }
    }

    async fn execute(
        &self,
        task: &Task,
        iterations: u32,
    ) -> Result<(String, Vec<IterationRecord>)> {
        // Input validation happens before any network call
        if task.description.trim().is_empty() {
            return Err(Error::invalid_input("task description must not be empty"));
        }
        if iterations > MAX_ITERATIONS {
            return Err(Error::invalid_input(format!(
                "iteration count {iterations} exceeds the maximum of {MAX_ITERATIONS}"
            )));
        }
        // Below-range counts degrade to a producer-only run
        let rounds = iterations.max(1);

        let mut records = Vec::with_capacity((2 * (rounds - 1) + 1) as usize);
        let mut current = self
            .step(&self.producer, &task.description, task, &mut records)
            .await?;

        for round in 2..=rounds {
            debug!(round, "refinement round starting");
            let critique = self
                .step(&self.reviewer, &review_prompt(&current), task, &mut records)
                .await?;
            current = self
                .step(
                    &self.specialist,
                    &improve_prompt(&current, &critique),
                    task,
                    &mut records,
                )
                .await?;
        }

        Ok((current, records))
    }

    /// Execute one step, record it, and apply the recovery policy
    async fn step(
        &self,
        agent: &Agent,
        prompt: &str,
        task: &Task,
        records: &mut Vec<IterationRecord>,
    ) -> Result<String> {
        let started = Instant::now();
        let outcome = agent.run(prompt, &task.context).await;

        let (output, recovered) = match outcome {
            Ok(text) => (text, false),
            Err(failure) => {
                if self.policy == RecoveryPolicy::AbortOnFailure {
                    return Err(Error::StepFailed {
                        role: agent.role,
                        message: failure.message,
                    });
                }
                (failure.token(agent.role), true)
            }
        };

        records.push(IterationRecord {
            index: records.len() as u32 + 1,
            role: agent.role,
            output: output.clone(),
            recovered,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });

        Ok(output)
    }
}

/// Assembles an orchestrator from the three fixed role bindings
#[derive(Default)]
pub struct OrchestratorBuilder {
    producer: Option<Agent>,
    reviewer: Option<Agent>,
    specialist: Option<Agent>,
    policy: RecoveryPolicy,
}

impl OrchestratorBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the producer binding
    pub fn producer(mut self, agent: Agent) -> Self {
        self.producer = Some(agent);
        self
    }

    /// Set the reviewer binding
    pub fn reviewer(mut self, agent: Agent) -> Self {
        self.reviewer = Some(agent);
        self
    }

    /// Set the specialist binding
    pub fn specialist(mut self, agent: Agent) -> Self {
        self.specialist = Some(agent);
        self
    }

    /// Set the recovery policy for contained step failures
    pub fn recovery_policy(mut self, policy: RecoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the orchestrator, failing if any role is unbound
    pub fn build(self) -> Result<Orchestrator> {
        Ok(Orchestrator {
            producer: self
                .producer
                .ok_or_else(|| Error::config("producer agent not configured"))?,
            reviewer: self
                .reviewer
                .ok_or_else(|| Error::config("reviewer agent not configured"))?,
            specialist: self
                .specialist
                .ok_or_else(|| Error::config("specialist agent not configured"))?,
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::collections::BTreeMap;
    use url::Url;

    const GEMINI_MODEL: &str = "gemini-2.0-flash";

    fn agent(role: Role, kind: ProviderKind, base_url: &str) -> Agent {
        let model = match kind {
            ProviderKind::Claude => "claude-sonnet-4",
            ProviderKind::OpenAi => "gpt-4o",
            ProviderKind::Gemini => GEMINI_MODEL,
        };
        let config = ProviderConfig::new(kind, model, Url::parse(base_url).unwrap(), "test-key");
        Agent::new(role, config).unwrap()
    }

    /// Producer on the claude protocol, reviewer on openai, specialist on
    /// gemini, all pointed at the same mock server
    fn orchestrator(server: &ServerGuard, policy: RecoveryPolicy) -> Orchestrator {
        Orchestrator::builder()
            .producer(agent(Role::Producer, ProviderKind::Claude, &server.url()))
            .reviewer(agent(Role::Reviewer, ProviderKind::OpenAi, &server.url()))
            .specialist(agent(Role::Specialist, ProviderKind::Gemini, &server.url()))
            .recovery_policy(policy)
            .build()
            .unwrap()
    }

    fn claude_body(text: &str) -> String {
        json!({"content": [{"type": "text", "text": text}]}).to_string()
    }

    fn openai_body(text: &str) -> String {
        json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]})
            .to_string()
    }

    fn gemini_body(text: &str) -> String {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
    }

    fn task() -> Task {
        Task::new("Write a launch announcement for product X")
            .unwrap()
            .with_context("client", json!("X"))
    }

    #[tokio::test]
    async fn test_single_iteration_runs_producer_only() {
        let mut server = Server::new_async().await;
        let producer = server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(claude_body("the draft"))
            .create_async()
            .await;
        let reviewer = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let result = orchestrator(&server, RecoveryPolicy::default())
            .run(task(), 1)
            .await;

        assert!(result.success);
        assert_eq!(result.final_text.as_deref(), Some("the draft"));
        assert_eq!(result.iterations.len(), 1);
        assert_eq!(result.iterations[0].index, 1);
        assert_eq!(result.iterations[0].role, Role::Producer);
        producer.assert_async().await;
        reviewer.assert_async().await;
    }

    #[tokio::test]
    async fn test_three_iterations_produce_five_records() {
        let mut server = Server::new_async().await;
        let _producer = server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(claude_body("the draft"))
            .create_async()
            .await;
        let _reviewer = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(openai_body("the critique"))
            .create_async()
            .await;
        let _specialist = server
            .mock("POST", &format!("/{GEMINI_MODEL}:generateContent")[..])
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(gemini_body("the revision"))
            .create_async()
            .await;

        let result = orchestrator(&server, RecoveryPolicy::default())
            .run(task(), 3)
            .await;

        assert!(result.success);
        assert_eq!(result.final_text.as_deref(), Some("the revision"));
        assert_eq!(result.iterations.len(), 5);

        let indices: Vec<u32> = result.iterations.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);

        let roles: Vec<Role> = result.iterations.iter().map(|r| r.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Producer,
                Role::Reviewer,
                Role::Specialist,
                Role::Reviewer,
                Role::Specialist,
            ]
        );
        assert_eq!(result.roles_used, Role::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_reviewer_failure_is_contained_in_transcript() {
        let mut server = Server::new_async().await;
        let _producer = server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(claude_body("the draft"))
            .create_async()
            .await;
        let _reviewer = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;
        let _specialist = server
            .mock("POST", &format!("/{GEMINI_MODEL}:generateContent")[..])
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(gemini_body("the revision"))
            .create_async()
            .await;

        let result = orchestrator(&server, RecoveryPolicy::default())
            .run(task(), 2)
            .await;

        assert!(result.success);
        assert_eq!(result.iterations.len(), 3);

        let reviewer_step = &result.iterations[1];
        assert_eq!(reviewer_step.role, Role::Reviewer);
        assert!(reviewer_step.recovered);
        assert!(reviewer_step.output.starts_with("[reviewer]"));
        assert!(reviewer_step.output.contains("500"));
        assert!(!result.iterations[0].recovered);
        assert!(!result.iterations[2].recovered);
    }

    #[tokio::test]
    async fn test_abort_policy_escalates_step_failure() {
        let mut server = Server::new_async().await;
        let _producer = server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(claude_body("the draft"))
            .create_async()
            .await;
        let _reviewer = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let result = orchestrator(&server, RecoveryPolicy::AbortOnFailure)
            .run(task(), 2)
            .await;

        assert!(!result.success);
        assert!(result.final_text.is_none());
        assert!(result.error.as_deref().unwrap().contains("reviewer step failed"));
    }

    #[tokio::test]
    async fn test_blank_task_fails_without_network_calls() {
        let mut server = Server::new_async().await;
        let producer = server
            .mock("POST", "/messages")
            .expect(0)
            .create_async()
            .await;

        // Bypasses Task::new validation the way a deserialized payload would
        let blank = Task {
            description: "   ".to_string(),
            context: BTreeMap::new(),
        };
        let result = orchestrator(&server, RecoveryPolicy::default())
            .run(blank, 3)
            .await;

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("invalid input"));
        assert!(result.iterations.is_empty());
        producer.assert_async().await;
    }

    #[tokio::test]
    async fn test_zero_iterations_degrade_to_one() {
        let mut server = Server::new_async().await;
        let _producer = server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(claude_body("the draft"))
            .create_async()
            .await;

        let result = orchestrator(&server, RecoveryPolicy::default())
            .run(task(), 0)
            .await;

        assert!(result.success);
        assert_eq!(result.iterations.len(), 1);
    }

    #[tokio::test]
    async fn test_excessive_iterations_are_rejected() {
        let mut server = Server::new_async().await;
        let producer = server
            .mock("POST", "/messages")
            .expect(0)
            .create_async()
            .await;

        let result = orchestrator(&server, RecoveryPolicy::default())
            .run(task(), MAX_ITERATIONS + 1)
            .await;

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("invalid input"));
        producer.assert_async().await;
    }

    #[tokio::test]
    async fn test_builder_requires_all_roles() {
        let server = Server::new_async().await;
        let result = Orchestrator::builder()
            .producer(agent(Role::Producer, ProviderKind::Claude, &server.url()))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }
}
