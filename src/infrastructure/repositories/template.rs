//! File-backed Template Store

use std::path::Path;

use crate::domain::entities::TemplateDocument;
use crate::domain::ports::TemplateRepository;
use crate::domain::value_objects::DocumentFormat;
use crate::error::{StagecraftError, StagecraftResult};

/// Loads template documents, placeholders intact
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTemplateStore;

impl FsTemplateStore {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRepository for FsTemplateStore {
    /// Load and parse the template at `path`.
    ///
    /// The format follows the file extension; the document is named after
    /// the file name.
    fn load(&self, path: &Path) -> StagecraftResult<TemplateDocument> {
        if !path.is_file() {
            return Err(StagecraftError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let source = super::read_source(path)?;
        let format = DocumentFormat::for_template(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let template =
            TemplateDocument::parse(name, format, &source).map_err(|e| StagecraftError::Parse {
                file: path.to_path_buf(),
                message: e.message,
            })?;

        tracing::debug!(
            template = %template.name(),
            format = %format,
            placeholders = template.placeholders().len(),
            "loaded template"
        );
        Ok(template)
    }
}
