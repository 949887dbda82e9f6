//! # Triad
//!
//! A fixed three-role iterative refinement pipeline over heterogeneous LLM
//! provider APIs.
//!
//! A task flows through role-bound agents in a deterministic order: the
//! **producer** drafts a deliverable, then each refinement round has the
//! **reviewer** critique the previous output and the **specialist** apply
//! the critique. Each role is backed by one of three provider families
//! (claude, openai, gemini), normalized behind a single adapter contract so
//! the controller never sees a wire format.
//!
//! ## Features
//!
//! - **Uniform agent contract**: one async `run(prompt, context)` over three
//!   incompatible request/response protocols
//! - **Failure containment**: a failed provider call becomes a structured
//!   step outcome (and a transcript token), not a run abort
//! - **Deterministic transcripts**: strictly ordered iteration records with
//!   per-step timing and recovery flags
//! - **No hidden state**: bindings are constructed explicitly and shared
//!   read-only across concurrent runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use triad::{Orchestrator, Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads TRIAD_PRODUCER_*, TRIAD_REVIEWER_* and TRIAD_SPECIALIST_*
//!     let orchestrator = Orchestrator::from_env()?;
//!
//!     let task = Task::new("Write a launch announcement for product X")?
//!         .with_context("client", serde_json::json!("X"));
//!
//!     let result = orchestrator.run(task, 3).await;
//!     println!("{}", result.final_text.unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod types;

mod prompts;

// Re-exports for convenience
pub use agent::{Agent, FailureKind, StepFailure, StepOutcome};
pub use config::{ProviderConfig, ProviderKind};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, RecoveryPolicy, MAX_ITERATIONS};
pub use types::{IterationRecord, OrchestrationResult, Role, RunId, Task};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Agent, StepOutcome};
    pub use crate::config::{ProviderConfig, ProviderKind};
    pub use crate::error::{Error, Result};
    pub use crate::orchestrator::{Orchestrator, RecoveryPolicy};
    pub use crate::types::{OrchestrationResult, Role, Task};
}
