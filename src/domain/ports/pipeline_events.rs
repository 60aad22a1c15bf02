//! Pipeline Event Port
//!
//! Observable interface for pipeline runs. Enables progress reporting,
//! NDJSON event streams for CI, and silent operation in tests.

use crate::domain::entities::StageStatus;

/// Event emitted while a pipeline runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Run started
    Started {
        template: String,
        stages: Vec<String>,
        context: String,
    },

    /// Preflight rendering finished for every stage
    Preflighted { stage_count: usize },

    /// A stage moved to a new status
    StageTransition {
        stage: String,
        status: StageStatus,
    },

    /// A stage will not apply
    StageSkipped { stage: String, reason: String },

    /// A stage applied; `identity` is the rendered document's audit name
    StageApplied { stage: String, identity: String },

    /// A stage failed validation or apply
    StageFailed {
        stage: String,
        status: StageStatus,
        diagnostics: Vec<String>,
    },

    /// Run stopped by an interrupt before `next_stage`
    Interrupted { next_stage: String },

    /// Run finished
    Completed {
        applied: usize,
        skipped: usize,
        failed: usize,
        pending: usize,
    },
}

/// Trait for receiving pipeline events
///
/// Implementations:
/// - `ConsoleEventSink`: human-readable progress on stdout
/// - `JsonEventSink`: NDJSON event stream for CI
/// - `NoopEventSink`: silent operation
pub trait PipelineEventSink {
    fn on_event(&self, event: PipelineEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl PipelineEventSink for NoopEventSink {
    fn on_event(&self, _event: PipelineEvent) {}
}
