//! Document Use Case
//!
//! One template rendered against one value set, optionally handed to the
//! stage tool. Backs the `render`, `validate` and `apply` commands.

use std::path::Path;

use chrono::Utc;

use crate::domain::entities::{RenderedDocument, StageStatus, TemplateDocument, ValueSet};
use crate::domain::ports::{StageTool, TemplateRepository, ToolRequest, ValueSetRepository};
use crate::domain::services::{render, unused_keys};
use crate::error::{StagecraftError, StagecraftResult};
use crate::infrastructure::{AuditLog, AuditRecord};

/// A rendered template together with the inputs it came from
#[derive(Debug, Clone)]
pub struct RenderedStage {
    pub template: TemplateDocument,
    pub values: ValueSet,
    pub document: RenderedDocument,
}

impl RenderedStage {
    /// Value-set keys the template never references
    pub fn unused_keys(&self) -> Vec<String> {
        unused_keys(&self.template, &self.values)
    }
}

/// Single-document use case, parameterized by its repositories
pub struct DocumentUseCase<TR, VR>
where
    TR: TemplateRepository,
    VR: ValueSetRepository,
{
    templates: TR,
    value_sets: VR,
}

impl<TR, VR> DocumentUseCase<TR, VR>
where
    TR: TemplateRepository,
    VR: ValueSetRepository,
{
    pub fn new(templates: TR, value_sets: VR) -> Self {
        Self {
            templates,
            value_sets,
        }
    }

    /// Load both inputs and render.
    pub fn render(&self, template: &Path, values: &Path) -> StagecraftResult<RenderedStage> {
        let template = self.templates.load(template)?;
        let values = self.value_sets.load(values)?;
        let document = render(&template, &values)?;
        Ok(RenderedStage {
            template,
            values,
            document,
        })
    }

    /// Render, then dry-run with `tool` when one is given.
    ///
    /// The value set name stands in for the stage name; the tool works in
    /// `<workdir>/<value set name>`.
    pub fn validate(
        &self,
        template: &Path,
        values: &Path,
        tool: Option<&dyn StageTool>,
        workdir: &Path,
    ) -> StagecraftResult<RenderedStage> {
        let rendered = self.render(template, values)?;
        let Some(tool) = tool else {
            return Ok(rendered);
        };

        let stage = rendered.values.name().to_string();
        let stage_dir = workdir.join(&stage);
        let request = ToolRequest {
            stage: &stage,
            document: &rendered.document,
            workdir: &stage_dir,
        };

        let mut report = tool.prepare(&request)?;
        if report.success {
            report = tool.validate(&request)?;
        }
        if !report.success {
            return Err(StagecraftError::ValidationFailed {
                stage,
                diagnostics: report.diagnostics,
            });
        }
        Ok(rendered)
    }

    /// Render and apply with `tool`, recording the attempt in `audit`.
    pub fn apply(
        &self,
        template: &Path,
        values: &Path,
        tool: &dyn StageTool,
        workdir: &Path,
        audit: Option<&AuditLog>,
    ) -> StagecraftResult<RenderedStage> {
        let rendered = self.render(template, values)?;
        let stage = rendered.values.name().to_string();
        let stage_dir = workdir.join(&stage);
        let request = ToolRequest {
            stage: &stage,
            document: &rendered.document,
            workdir: &stage_dir,
        };

        let prepared = tool.prepare(&request)?;
        let report = if prepared.success {
            tool.apply(&request)?
        } else {
            prepared
        };

        if let Some(audit) = audit {
            let outcome = if report.success {
                StageStatus::Applied
            } else {
                StageStatus::ApplyFailed
            };
            let archived = audit.archive(&stage, &rendered.document)?;
            audit.append(
                &AuditRecord::new(
                    Utc::now(),
                    &stage,
                    &rendered.document,
                    outcome,
                    report.diagnostics.clone(),
                )
                .with_document(archived),
            )?;
        }

        if !report.success {
            return Err(StagecraftError::ApplyFailed {
                stage,
                diagnostics: report.diagnostics,
            });
        }
        tracing::info!(identity = %rendered.document.identity(), "applied document");
        Ok(rendered)
    }
}
