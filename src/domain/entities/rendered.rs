//! Rendered document entity - a template with every placeholder resolved

use crate::domain::value_objects::{ContentHash, DocumentFormat};

/// Fully resolved configuration, ready for the external apply tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    template: String,
    environment: String,
    format: DocumentFormat,
    content: String,
    digest: ContentHash,
}

impl RenderedDocument {
    pub fn new(
        template: impl Into<String>,
        environment: impl Into<String>,
        format: DocumentFormat,
        content: String,
    ) -> Self {
        let digest = ContentHash::from_content(&content);
        Self {
            template: template.into(),
            environment: environment.into(),
            format,
            content,
            digest,
        }
    }

    /// Template file name this document was rendered from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Name of the value set it was rendered with
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn digest(&self) -> &ContentHash {
        &self.digest
    }

    /// `template@environment`
    pub fn name(&self) -> String {
        format!("{}@{}", self.template, self.environment)
    }

    /// Identifying name echoed on apply for audit
    pub fn identity(&self) -> String {
        format!("{} {}", self.name(), self.digest.short())
    }
}
