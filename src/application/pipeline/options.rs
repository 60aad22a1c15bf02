//! Pipeline Options

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::domain::entities::Stage;
use crate::domain::value_objects::RunContext;

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Stages in promotion order
    pub stages: Vec<Stage>,
    /// Root of the per-stage working directories
    pub workdir: PathBuf,
    /// Branch and event the run was started for
    pub context: RunContext,
    /// Validate every stage, apply none
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn new(stages: Vec<Stage>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            stages,
            workdir: workdir.into(),
            context: RunContext::default(),
            dry_run: false,
        }
    }

    /// Stages and workdir taken from a loaded config
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.stages(), config.workdir_path())
    }

    pub fn with_context(mut self, context: RunContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Working directory of one stage
    pub fn stage_dir(&self, stage: &str) -> PathBuf {
        self.workdir.join(stage)
    }
}
