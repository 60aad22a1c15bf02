//! Pipeline Use Case
//!
//! Orchestrates a promotion run:
//! 1. Preflight: load and render every stage's value set
//! 2. For each stage in order: prepare, validate, then apply if the
//!    trigger holds and the gate passes
//! 3. Halt on the first validation or apply failure
//!
//! Stages never run concurrently and failed calls are never retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::{RenderedDocument, Stage, StageStatus, TemplateDocument};
use crate::domain::ports::{
    NoopEventSink, PipelineEvent, PipelineEventSink, StageTool, ToolReport, ToolRequest,
    ValueSetRepository,
};
use crate::domain::services::render;
use crate::error::{StageFailure, StagecraftError, StagecraftResult};
use crate::infrastructure::{AuditLog, AuditRecord};

use super::options::PipelineOptions;
use super::result::{PipelineReport, StageOutcome};

/// Pipeline driver, parameterized by its value set source and stage tool
pub struct PipelineDriver<VR, T>
where
    VR: ValueSetRepository,
    T: StageTool,
{
    value_sets: VR,
    tool: T,
    events: Arc<dyn PipelineEventSink>,
    interrupt: Arc<AtomicBool>,
    audit: Option<AuditLog>,
}

impl<VR, T> PipelineDriver<VR, T>
where
    VR: ValueSetRepository,
    T: StageTool,
{
    pub fn new(value_sets: VR, tool: T) -> Self {
        Self {
            value_sets,
            tool,
            events: Arc::new(NoopEventSink),
            interrupt: Arc::new(AtomicBool::new(false)),
            audit: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn PipelineEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Flag checked before each stage; once set, remaining stages stay pending.
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Render every stage before any tool runs.
    ///
    /// Fails with `Preflight` listing each failing stage, so one run shows
    /// every missing key across all environments.
    pub fn preflight(
        &self,
        template: &TemplateDocument,
        stages: &[Stage],
    ) -> StagecraftResult<Vec<RenderedDocument>> {
        let mut documents = Vec::with_capacity(stages.len());
        let mut failures = Vec::new();

        for stage in stages {
            match self
                .value_sets
                .load(&stage.values)
                .and_then(|values| render(template, &values))
            {
                Ok(document) => documents.push(document),
                Err(error) => failures.push(StageFailure {
                    stage: stage.name.clone(),
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            return Err(StagecraftError::Preflight { failures });
        }
        Ok(documents)
    }

    /// Run the pipeline.
    ///
    /// Returns `Err` only when preflight fails; stage failures and interrupts
    /// are recorded in the report.
    pub fn run(
        &self,
        template: &TemplateDocument,
        options: &PipelineOptions,
    ) -> StagecraftResult<PipelineReport> {
        self.events.on_event(PipelineEvent::Started {
            template: template.name().to_string(),
            stages: options.stages.iter().map(|s| s.name.clone()).collect(),
            context: options.context.to_string(),
        });

        let documents = self.preflight(template, &options.stages)?;
        self.events.on_event(PipelineEvent::Preflighted {
            stage_count: documents.len(),
        });

        let mut report = PipelineReport {
            outcomes: options
                .stages
                .iter()
                .zip(&documents)
                .map(|(stage, doc)| StageOutcome::pending(&stage.name, doc.identity()))
                .collect(),
            interrupted_before: None,
        };

        for (index, (stage, document)) in options.stages.iter().zip(&documents).enumerate() {
            if self.interrupt.load(Ordering::SeqCst) {
                tracing::warn!(stage = %stage.name, "interrupted, remaining stages left pending");
                self.events.on_event(PipelineEvent::Interrupted {
                    next_stage: stage.name.clone(),
                });
                report.interrupted_before = Some(stage.name.clone());
                break;
            }

            let previous = index
                .checked_sub(1)
                .map(|i| report.outcomes[i].status);
            let stage_dir = options.stage_dir(&stage.name);
            let request = ToolRequest {
                stage: &stage.name,
                document,
                workdir: &stage_dir,
            };

            let outcome = &mut report.outcomes[index];
            let halt = self.run_stage(stage, &request, previous, options, outcome);
            if halt {
                break;
            }
        }

        self.events.on_event(PipelineEvent::Completed {
            applied: report.count(StageStatus::Applied),
            skipped: report.count(StageStatus::Skipped),
            failed: report.failed(),
            pending: report.count(StageStatus::Pending),
        });
        Ok(report)
    }

    /// Drive one stage to a terminal status. Returns `true` if the pipeline must halt.
    fn run_stage(
        &self,
        stage: &Stage,
        request: &ToolRequest<'_>,
        previous: Option<StageStatus>,
        options: &PipelineOptions,
        outcome: &mut StageOutcome,
    ) -> bool {
        self.enter(outcome, StageStatus::Validating);
        let validation = self
            .tool
            .prepare(request)
            .and_then(|report| {
                if report.success {
                    self.tool.validate(request)
                } else {
                    Ok(report)
                }
            });
        let report = settle(validation);
        if !report.success {
            self.fail(outcome, StageStatus::ValidationFailed, report.diagnostics);
            return true;
        }
        self.enter(outcome, StageStatus::Validated);

        if let Some(reason) = self.skip_reason(stage, previous, options) {
            self.enter(outcome, StageStatus::Skipped);
            tracing::info!(stage = %stage.name, reason = %reason, "stage skipped");
            self.events.on_event(PipelineEvent::StageSkipped {
                stage: stage.name.clone(),
                reason: reason.clone(),
            });
            outcome.reason = Some(reason);
            return false;
        }

        self.enter(outcome, StageStatus::Applying);
        let report = settle(self.tool.apply(request));
        self.record_audit(&stage.name, request.document, &report);
        if !report.success {
            self.fail(outcome, StageStatus::ApplyFailed, report.diagnostics);
            return true;
        }

        self.enter(outcome, StageStatus::Applied);
        self.events.on_event(PipelineEvent::StageApplied {
            stage: stage.name.clone(),
            identity: request.document.identity(),
        });
        false
    }

    fn skip_reason(
        &self,
        stage: &Stage,
        previous: Option<StageStatus>,
        options: &PipelineOptions,
    ) -> Option<String> {
        if options.dry_run {
            return Some("dry run".to_string());
        }
        if let Some(reason) = stage.trigger.mismatch(&options.context) {
            return Some(reason);
        }
        if !stage.gate.passes(previous) {
            let status = previous.map(|s| s.as_str()).unwrap_or("pending");
            return Some(format!(
                "previous stage ended {}, gate requires applied",
                status
            ));
        }
        None
    }

    fn enter(&self, outcome: &mut StageOutcome, status: StageStatus) {
        if outcome.advance(status) {
            tracing::info!(stage = %outcome.stage, status = %status, "stage transition");
            self.events.on_event(PipelineEvent::StageTransition {
                stage: outcome.stage.clone(),
                status,
            });
        }
    }

    fn fail(&self, outcome: &mut StageOutcome, status: StageStatus, diagnostics: Vec<String>) {
        self.enter(outcome, status);
        outcome.diagnostics = diagnostics;
        self.events.on_event(PipelineEvent::StageFailed {
            stage: outcome.stage.clone(),
            status,
            diagnostics: outcome.diagnostics.clone(),
        });
    }

    fn record_audit(&self, stage: &str, document: &RenderedDocument, report: &ToolReport) {
        let Some(audit) = &self.audit else { return };
        let outcome = if report.success {
            StageStatus::Applied
        } else {
            StageStatus::ApplyFailed
        };
        let mut record = AuditRecord::new(
            Utc::now(),
            stage,
            document,
            outcome,
            report.diagnostics.clone(),
        );
        match audit.archive(stage, document) {
            Ok(path) => record = record.with_document(path),
            Err(e) => tracing::warn!(stage = %stage, error = %e, "failed to archive applied document"),
        }
        if let Err(e) = audit.append(&record) {
            tracing::warn!(path = %audit.path().display(), error = %e, "failed to write audit record");
        }
    }
}

/// A tool that could not run at all counts as a failed call.
fn settle(result: StagecraftResult<ToolReport>) -> ToolReport {
    result.unwrap_or_else(|e| ToolReport::failure(vec![e.to_string()]))
}
