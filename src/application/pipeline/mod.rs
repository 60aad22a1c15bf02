//! Pipeline Driver
//!
//! Drives every configured stage through its state machine, in order.

mod options;
mod result;
mod use_case;

#[cfg(test)]
mod tests;

pub use options::PipelineOptions;
pub use result::{PipelineReport, StageOutcome};
pub use use_case::PipelineDriver;
