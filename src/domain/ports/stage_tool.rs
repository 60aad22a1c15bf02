//! Stage Tool Port
//!
//! The external program that dry-runs and applies a rendered document
//! (e.g. `terraform plan` / `terraform apply`). Each call is one blocking
//! attempt; the pipeline never retries.

use std::path::Path;

use crate::domain::entities::RenderedDocument;
use crate::error::StagecraftResult;

/// What the tool is asked to act on
#[derive(Debug, Clone, Copy)]
pub struct ToolRequest<'a> {
    pub stage: &'a str,
    pub document: &'a RenderedDocument,
    /// Directory prepared for this stage's run
    pub workdir: &'a Path,
}

/// Outcome of one tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolReport {
    pub success: bool,
    /// Error lines worth showing to an operator
    pub diagnostics: Vec<String>,
    /// Captured output, kept for verbose display
    pub output: String,
}

impl ToolReport {
    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(diagnostics: Vec<String>) -> Self {
        Self {
            success: false,
            diagnostics,
            output: String::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// External validate/apply tool
///
/// `Err` means the tool could not be run at all (missing binary, unwritable
/// workdir). A tool that ran and rejected the document returns
/// `Ok(report)` with `success == false`.
pub trait StageTool {
    /// One-time setup before validation (e.g. `terraform init`)
    fn prepare(&self, _request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        Ok(ToolReport::success())
    }

    /// Dry-run the rendered document
    fn validate(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport>;

    /// Apply the rendered document
    fn apply(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport>;
}
