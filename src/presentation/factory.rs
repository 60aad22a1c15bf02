//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::application::{DiffUseCase, DocumentUseCase, PipelineDriver};
use crate::config::{EnvVars, PipelineConfig};
use crate::domain::ports::PipelineEventSink;
use crate::infrastructure::{AuditLog, CommandTool, FsTemplateStore, FsValueSetRepository};

/// Type alias for the concrete DocumentUseCase with all dependencies
pub type ConcreteDocumentUseCase = DocumentUseCase<FsTemplateStore, FsValueSetRepository>;

/// Type alias for the concrete DiffUseCase with all dependencies
pub type ConcreteDiffUseCase = DiffUseCase<FsTemplateStore, FsValueSetRepository>;

/// Type alias for the concrete PipelineDriver with all dependencies
pub type ConcretePipelineDriver = PipelineDriver<FsValueSetRepository, CommandTool>;

pub fn create_document_use_case() -> ConcreteDocumentUseCase {
    DocumentUseCase::new(FsTemplateStore::new(), FsValueSetRepository::new())
}

pub fn create_diff_use_case() -> ConcreteDiffUseCase {
    DiffUseCase::new(FsTemplateStore::new(), FsValueSetRepository::new())
}

/// Stage tool configured by `[tool]`, with its environment taken from `vars`
pub fn create_command_tool(config: &PipelineConfig, vars: &EnvVars) -> CommandTool {
    CommandTool::from_config(&config.tool, config.output_file_name(), vars)
}

/// Pipeline driver for `config`, auditing into its workdir
pub fn create_pipeline_driver(
    config: &PipelineConfig,
    vars: &EnvVars,
    events: Arc<dyn PipelineEventSink>,
    interrupt: Arc<AtomicBool>,
) -> ConcretePipelineDriver {
    PipelineDriver::new(FsValueSetRepository::new(), create_command_tool(config, vars))
        .with_events(events)
        .with_interrupt(interrupt)
        .with_audit_log(AuditLog::in_dir(&config.workdir_path()))
}
