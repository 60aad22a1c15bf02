//! Pipeline driver tests with in-memory value sets and a recording tool

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::domain::entities::{
    Stage, StageGate, StageStatus, TemplateDocument, ValueSet,
};
use crate::domain::ports::{
    PipelineEvent, PipelineEventSink, StageTool, ToolReport, ToolRequest, ValueSetRepository,
};
use crate::domain::value_objects::{DocumentFormat, RunContext, Trigger, TriggerEvent};
use crate::error::{StagecraftError, StagecraftResult};
use crate::infrastructure::AuditLog;

#[derive(Default)]
struct MemoryValueSets {
    sets: HashMap<PathBuf, ValueSet>,
}

impl MemoryValueSets {
    fn with(mut self, name: &str, pairs: &[(&str, &str)]) -> Self {
        let set = ValueSet::from_pairs(name, pairs.iter().copied()).unwrap();
        self.sets.insert(PathBuf::from(format!("{}.tfvars", name)), set);
        self
    }
}

impl ValueSetRepository for MemoryValueSets {
    fn load(&self, path: &Path) -> StagecraftResult<ValueSet> {
        self.sets
            .get(path)
            .cloned()
            .ok_or_else(|| StagecraftError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Records `(operation, stage)` for every call
#[derive(Default)]
struct RecordingTool {
    calls: Mutex<Vec<(String, String)>>,
    reject_validate: HashSet<String>,
    reject_apply: HashSet<String>,
    on_apply: Option<Arc<AtomicBool>>,
}

impl RecordingTool {
    fn rejecting_validate(mut self, stage: &str) -> Self {
        self.reject_validate.insert(stage.to_string());
        self
    }

    fn rejecting_apply(mut self, stage: &str) -> Self {
        self.reject_apply.insert(stage.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(op, stage)| format!("{}:{}", op, stage))
            .collect()
    }

    fn record(&self, op: &str, request: &ToolRequest<'_>) {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), request.stage.to_string()));
    }
}

impl StageTool for RecordingTool {
    fn validate(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        self.record("validate", request);
        if self.reject_validate.contains(request.stage) {
            return Ok(ToolReport::failure(vec!["Error: invalid domain".to_string()]));
        }
        Ok(ToolReport::success())
    }

    fn apply(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        self.record("apply", request);
        if let Some(flag) = &self.on_apply {
            flag.store(true, Ordering::SeqCst);
        }
        if self.reject_apply.contains(request.stage) {
            return Ok(ToolReport::failure(vec!["Error: quota exceeded".to_string()]));
        }
        Ok(ToolReport::success())
    }
}

impl StageTool for &RecordingTool {
    fn validate(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        (**self).validate(request)
    }

    fn apply(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        (**self).apply(request)
    }
}

struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl PipelineEventSink for RecordingSink {
    fn on_event(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn template() -> TemplateDocument {
    TemplateDocument::parse(
        "fastly.tf.json",
        DocumentFormat::Json,
        r#"{"name": "${fastly_name}", "domain": "${fastly_domain}"}"#,
    )
    .unwrap()
}

fn value_sets() -> MemoryValueSets {
    MemoryValueSets::default()
        .with(
            "staging",
            &[("fastly_name", "svc-a"), ("fastly_domain", "a.example.com")],
        )
        .with(
            "production",
            &[("fastly_name", "svc-p"), ("fastly_domain", "p.example.com")],
        )
}

fn stage(name: &str) -> Stage {
    Stage::new(name, format!("{}.tfvars", name))
}

fn push_to_master() -> RunContext {
    RunContext::new(Some("master".to_string()), Some(TriggerEvent::Push))
}

fn options(stages: Vec<Stage>) -> PipelineOptions {
    PipelineOptions::new(stages, "/tmp/stagecraft-tests").with_context(push_to_master())
}

fn statuses(report: &PipelineReport) -> Vec<StageStatus> {
    report.outcomes.iter().map(|o| o.status).collect()
}

#[test]
fn test_applies_every_stage_in_order() {
    let tool = RecordingTool::default();
    let driver = PipelineDriver::new(value_sets(), &tool);

    let report = driver
        .run(&template(), &options(vec![stage("staging"), stage("production")]))
        .unwrap();

    assert!(report.is_success());
    assert_eq!(statuses(&report), vec![StageStatus::Applied, StageStatus::Applied]);
    assert_eq!(
        tool.calls(),
        vec![
            "validate:staging",
            "apply:staging",
            "validate:production",
            "apply:production"
        ]
    );
}

#[test]
fn test_validation_failure_halts_before_later_stages() {
    let tool = RecordingTool::default().rejecting_validate("staging");
    let driver = PipelineDriver::new(value_sets(), &tool);

    let report = driver
        .run(&template(), &options(vec![stage("staging"), stage("production")]))
        .unwrap();

    assert_eq!(
        statuses(&report),
        vec![StageStatus::ValidationFailed, StageStatus::Pending]
    );
    assert_eq!(tool.calls(), vec!["validate:staging"]);
    assert_eq!(
        report.outcome("staging").unwrap().diagnostics,
        vec!["Error: invalid domain"]
    );
    assert!(matches!(
        report.error(),
        Some(StagecraftError::ValidationFailed { stage, .. }) if stage == "staging"
    ));
}

#[test]
fn test_apply_failure_is_fatal() {
    let tool = RecordingTool::default().rejecting_apply("staging");
    let driver = PipelineDriver::new(value_sets(), &tool);

    let report = driver
        .run(&template(), &options(vec![stage("staging"), stage("production")]))
        .unwrap();

    assert_eq!(
        statuses(&report),
        vec![StageStatus::ApplyFailed, StageStatus::Pending]
    );
    assert!(!tool.calls().iter().any(|c| c.ends_with(":production")));
    assert!(matches!(report.error(), Some(StagecraftError::ApplyFailed { .. })));
}

#[test]
fn test_false_trigger_skips_without_applying() {
    let tool = RecordingTool::default();
    let driver = PipelineDriver::new(value_sets(), &tool);
    let production = stage("production")
        .with_trigger(Trigger::on_branches(["master"]).with_events(vec![TriggerEvent::Push]));
    let opts = PipelineOptions::new(vec![stage("staging"), production], "/tmp/stagecraft-tests")
        .with_context(RunContext::new(
            Some("master".to_string()),
            Some(TriggerEvent::PullRequest),
        ));

    let report = driver.run(&template(), &opts).unwrap();

    assert!(report.is_success());
    let outcome = report.outcome("production").unwrap();
    assert_eq!(outcome.status, StageStatus::Skipped);
    assert_eq!(
        outcome.reason.as_deref(),
        Some("event 'pull_request' is not one of [push]")
    );
    assert!(tool.calls().contains(&"validate:production".to_string()));
    assert!(!tool.calls().contains(&"apply:production".to_string()));
}

#[test]
fn test_previous_applied_gate_skips_after_skipped_stage() {
    let tool = RecordingTool::default();
    let driver = PipelineDriver::new(value_sets(), &tool);
    let staging = stage("staging").with_trigger(Trigger::on_branches(["release/*"]));
    let production = stage("production").with_gate(StageGate::PreviousApplied);

    let report = driver
        .run(&template(), &options(vec![staging, production]))
        .unwrap();

    assert_eq!(statuses(&report), vec![StageStatus::Skipped, StageStatus::Skipped]);
    assert_eq!(
        report.outcome("production").unwrap().reason.as_deref(),
        Some("previous stage ended skipped, gate requires applied")
    );
}

#[test]
fn test_default_gate_accepts_skipped_predecessor() {
    let tool = RecordingTool::default();
    let driver = PipelineDriver::new(value_sets(), &tool);
    let staging = stage("staging").with_trigger(Trigger::on_branches(["release/*"]));

    let report = driver
        .run(&template(), &options(vec![staging, stage("production")]))
        .unwrap();

    assert_eq!(statuses(&report), vec![StageStatus::Skipped, StageStatus::Applied]);
}

#[test]
fn test_dry_run_validates_but_never_applies() {
    let tool = RecordingTool::default();
    let driver = PipelineDriver::new(value_sets(), &tool);

    let report = driver
        .run(
            &template(),
            &options(vec![stage("staging"), stage("production")]).with_dry_run(true),
        )
        .unwrap();

    assert_eq!(statuses(&report), vec![StageStatus::Skipped, StageStatus::Skipped]);
    assert!(tool.calls().iter().all(|c| c.starts_with("validate:")));
    assert_eq!(report.outcomes[0].reason.as_deref(), Some("dry run"));
}

#[test]
fn test_preflight_reports_every_failing_stage_before_any_tool_runs() {
    let tool = RecordingTool::default();
    let sets = MemoryValueSets::default()
        .with("staging", &[("fastly_name", "svc-a")])
        .with("production", &[]);
    let driver = PipelineDriver::new(sets, &tool);

    let err = driver
        .run(&template(), &options(vec![stage("staging"), stage("production")]))
        .unwrap_err();

    let StagecraftError::Preflight { failures } = err else {
        panic!("expected preflight failure");
    };
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].stage, "staging");
    assert!(failures[0].error.to_string().contains("fastly_domain"));
    assert!(failures[1].error.to_string().contains("fastly_domain, fastly_name"));
    assert!(tool.calls().is_empty());
}

#[test]
fn test_interrupt_leaves_remaining_stages_pending() {
    let interrupt = Arc::new(AtomicBool::new(false));
    let tool = RecordingTool {
        on_apply: Some(interrupt.clone()),
        ..RecordingTool::default()
    };
    let driver = PipelineDriver::new(value_sets(), &tool).with_interrupt(interrupt);

    let report = driver
        .run(&template(), &options(vec![stage("staging"), stage("production")]))
        .unwrap();

    assert_eq!(statuses(&report), vec![StageStatus::Applied, StageStatus::Pending]);
    assert_eq!(report.interrupted_before.as_deref(), Some("production"));
    assert!(!report.is_success());
}

#[test]
fn test_events_follow_state_machine() {
    let tool = RecordingTool::default();
    let sink = Arc::new(RecordingSink {
        events: Mutex::new(Vec::new()),
    });
    let driver = PipelineDriver::new(value_sets(), &tool).with_events(sink.clone());

    driver
        .run(&template(), &options(vec![stage("staging")]))
        .unwrap();

    let events = sink.events.lock().unwrap();
    let transitions: Vec<StageStatus> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::StageTransition { status, .. } => Some(*status),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            StageStatus::Validating,
            StageStatus::Validated,
            StageStatus::Applying,
            StageStatus::Applied
        ]
    );
    assert!(matches!(events.first(), Some(PipelineEvent::Started { .. })));
    assert!(matches!(
        events.last(),
        Some(PipelineEvent::Completed { applied: 1, .. })
    ));
}

#[test]
fn test_apply_attempts_are_audited() {
    let dir = tempfile::tempdir().unwrap();
    let tool = RecordingTool::default().rejecting_apply("production");
    let audit = AuditLog::in_dir(dir.path());
    let driver = PipelineDriver::new(value_sets(), &tool).with_audit_log(audit.clone());

    let report = driver
        .run(&template(), &options(vec![stage("staging"), stage("production")]))
        .unwrap();

    let records = audit.read().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].outcome, "applied");
    assert_eq!(records[0].identity, report.outcomes[0].identity);
    assert_eq!(records[1].outcome, "apply_failed");
    for record in &records {
        let archived = record.document.as_deref().unwrap();
        assert!(archived.starts_with(&format!("{}/history/", record.stage)));
        assert!(dir.path().join(archived).is_file());
    }
}

#[test]
fn test_reapplying_changed_values_keeps_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let tool = RecordingTool::default();
    let audit = AuditLog::in_dir(dir.path());
    let first = MemoryValueSets::default().with(
        "staging",
        &[("fastly_name", "svc-a"), ("fastly_domain", "a.example.com")],
    );
    let second = MemoryValueSets::default().with(
        "staging",
        &[("fastly_name", "svc-b"), ("fastly_domain", "b.example.com")],
    );

    for sets in [first, second] {
        PipelineDriver::new(sets, &tool)
            .with_audit_log(audit.clone())
            .run(&template(), &options(vec![stage("staging")]))
            .unwrap();
    }

    let records = audit.read().unwrap();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].digest, records[1].digest);
    assert_ne!(records[0].document, records[1].document);
    let history = dir.path().join("staging/history");
    assert_eq!(std::fs::read_dir(&history).unwrap().count(), 2);
    let kept = records[0].document.as_deref().unwrap();
    assert!(std::fs::read_to_string(dir.path().join(kept))
        .unwrap()
        .contains("svc-a"));
}
