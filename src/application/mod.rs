//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `PipelineDriver` - Preflight, then validate and conditionally apply each stage in order
//! - `DocumentUseCase` - Render, validate or apply one template against one value set
//! - `DiffUseCase` - Compare what two environments would receive

pub mod diff;
pub mod document;
pub mod pipeline;

pub use diff::{DiffUseCase, PromotionDiff};
pub use document::{DocumentUseCase, RenderedStage};
pub use pipeline::{PipelineDriver, PipelineOptions, PipelineReport, StageOutcome};
