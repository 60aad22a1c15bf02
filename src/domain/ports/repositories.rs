//! Repository ports - loading templates and value sets
//!
//! Implemented by the infrastructure layer on top of the file system.

use std::path::Path;

use crate::domain::entities::{TemplateDocument, ValueSet};
use crate::error::StagecraftResult;

/// Source of template documents
pub trait TemplateRepository {
    /// Load a template; `NotFound` if absent, `Parse` if malformed.
    fn load(&self, path: &Path) -> StagecraftResult<TemplateDocument>;
}

/// Source of environment value sets
pub trait ValueSetRepository {
    /// Load a value set; `NotFound` if absent, `Parse` if malformed.
    fn load(&self, path: &Path) -> StagecraftResult<ValueSet>;
}
