//! Pipeline Result
//!
//! Final state of every stage after a run.

use crate::domain::entities::StageStatus;
use crate::error::StagecraftError;

/// Final state of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: String,
    pub status: StageStatus,
    /// Why the stage did not apply
    pub reason: Option<String>,
    /// Identity of the document rendered for this stage
    pub identity: String,
    /// Tool output lines for a failed validate or apply
    pub diagnostics: Vec<String>,
}

impl StageOutcome {
    pub fn pending(stage: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Pending,
            reason: None,
            identity: identity.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Move to `next` if the state machine allows it.
    ///
    /// Returns `false` and leaves the status unchanged otherwise.
    pub fn advance(&mut self, next: StageStatus) -> bool {
        if !self.status.can_transition_to(next) {
            tracing::error!(
                stage = %self.stage,
                from = %self.status,
                to = %next,
                "rejected stage transition"
            );
            return false;
        }
        self.status = next;
        true
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// One entry per configured stage, in order
    pub outcomes: Vec<StageOutcome>,
    /// Set when an interrupt stopped the run before this stage
    pub interrupted_before: Option<String>,
}

impl PipelineReport {
    pub fn count(&self, status: StageStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_failure()).count()
    }

    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.interrupted_before.is_none()
    }

    /// The error that ended the run, if any
    pub fn error(&self) -> Option<StagecraftError> {
        if let Some(outcome) = self.outcomes.iter().find(|o| o.status.is_failure()) {
            let stage = outcome.stage.clone();
            let diagnostics = outcome.diagnostics.clone();
            return Some(match outcome.status {
                StageStatus::ValidationFailed => StagecraftError::ValidationFailed { stage, diagnostics },
                _ => StagecraftError::ApplyFailed { stage, diagnostics },
            });
        }
        self.interrupted_before
            .as_ref()
            .map(|next_stage| StagecraftError::Interrupted {
                next_stage: next_stage.clone(),
            })
    }
}
