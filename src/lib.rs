//! Stagecraft - multi-environment configuration promotion
//!
//! One base configuration document with named placeholders is rendered
//! against one value set per deployment stage. Each rendered document is
//! validated by an external dry-run tool and, when the stage's trigger holds,
//! applied by an external apply tool. Stages run strictly in order.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{DocumentUseCase, PipelineDriver, PipelineOptions, PipelineReport};
pub use config::{PipelineConfig, CONFIG_FILE};
pub use domain::entities::{RenderedDocument, Stage, StageStatus, TemplateDocument, ValueSet};
pub use domain::services::render;
pub use error::{StagecraftError, StagecraftResult};
