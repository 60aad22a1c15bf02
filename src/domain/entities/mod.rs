//! Domain Entities
//!
//! Core domain entities with identity and lifecycle.

mod rendered;
mod stage;
mod template;
mod value_set;

pub use rendered::RenderedDocument;
pub use stage::{Stage, StageGate, StageStatus};
pub use template::{Node, Scalar, TemplateDocument, TemplateParseError};
pub use value_set::{Value, ValueSet};
