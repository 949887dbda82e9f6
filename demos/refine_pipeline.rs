//! End-to-end refinement pipeline demo.
//!
//! Expects TRIAD_PRODUCER_*, TRIAD_REVIEWER_* and TRIAD_SPECIALIST_*
//! environment variables (see README), then runs a three-iteration
//! refinement and prints the result as JSON.

use anyhow::Result;
use triad::{Orchestrator, Task};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let orchestrator = Orchestrator::from_env()?;

    let task = Task::new("Write a launch announcement for product X")?
        .with_context("client", serde_json::json!("X"));

    let result = orchestrator.run(task, 3).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
