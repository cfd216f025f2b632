//! The stage contract.
//!
//! A stage performs exactly one externally-collaborating operation
//! (transcribe, summarize, deliver). `execute` is the error-containment
//! boundary: every failure raised by the collaborator is caught, logged
//! with full detail, and converted into a `StageOutcome::Failure` carrying
//! a short summary. A stage never returns an error to its caller.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::domain::StageOutcome;

/// A single pipeline stage.
///
/// Implementors provide `process`; callers go through `execute`, which
/// wraps `process` with logging and failure conversion.
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Stage name, used as the logging scope
    fn name(&self) -> &'static str;

    /// Perform the stage's work. May fail with any collaborator error.
    async fn process(&self, input: Self::Input) -> Result<Self::Output>;

    /// Execute the stage. Never returns an error: all failures become
    /// `StageOutcome::Failure` with the top-level error message as the
    /// reason. The full error chain goes to the log.
    async fn execute(&self, input: Self::Input) -> StageOutcome<Self::Output> {
        debug!(stage = self.name(), "Stage starting");

        match self.process(input).await {
            Ok(output) => {
                info!(stage = self.name(), "Stage completed");
                StageOutcome::Success(output)
            }
            Err(e) => {
                error!(stage = self.name(), error = ?e, "Stage failed");
                StageOutcome::Failure(e.to_string())
            }
        }
    }
}
