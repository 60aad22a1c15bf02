//! Diff Use Case
//!
//! Renders one template for two environments and shows what promotion
//! from the first to the second changes.

use std::path::Path;

use similar::{ChangeTag, TextDiff};

use crate::domain::entities::RenderedDocument;
use crate::domain::ports::{TemplateRepository, ValueSetRepository};
use crate::domain::services::render;
use crate::error::StagecraftResult;

/// Two renderings of the same template
#[derive(Debug, Clone)]
pub struct PromotionDiff {
    pub from: RenderedDocument,
    pub to: RenderedDocument,
}

impl PromotionDiff {
    pub fn has_changes(&self) -> bool {
        self.from.content() != self.to.content()
    }

    /// `(additions, deletions)` in lines
    pub fn stats(&self) -> (usize, usize) {
        let diff = TextDiff::from_lines(self.from.content(), self.to.content());
        diff.iter_all_changes()
            .fold((0, 0), |(add, del), change| match change.tag() {
                ChangeTag::Insert => (add + 1, del),
                ChangeTag::Delete => (add, del + 1),
                ChangeTag::Equal => (add, del),
            })
    }

    /// Unified diff with `a/<from>` and `b/<to>` headers
    pub fn unified(&self) -> String {
        TextDiff::from_lines(self.from.content(), self.to.content())
            .unified_diff()
            .header(
                &format!("a/{}", self.from.name()),
                &format!("b/{}", self.to.name()),
            )
            .to_string()
    }
}

pub struct DiffUseCase<TR, VR>
where
    TR: TemplateRepository,
    VR: ValueSetRepository,
{
    templates: TR,
    value_sets: VR,
}

impl<TR, VR> DiffUseCase<TR, VR>
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

    pub fn execute(&self, template: &Path, from: &Path, to: &Path) -> StagecraftResult<PromotionDiff> {
        let template = self.templates.load(template)?;
        let from = render(&template, &self.value_sets.load(from)?)?;
        let to = render(&template, &self.value_sets.load(to)?)?;
        Ok(PromotionDiff { from, to })
    }
}
