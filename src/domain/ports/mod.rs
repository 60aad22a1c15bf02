//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod pipeline_events;
pub mod repositories;
pub mod stage_tool;

pub use pipeline_events::{NoopEventSink, PipelineEvent, PipelineEventSink};
pub use repositories::{TemplateRepository, ValueSetRepository};
pub use stage_tool::{StageTool, ToolReport, ToolRequest};
