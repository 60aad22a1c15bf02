//! External Stage Tools
//!
//! Implementations of the `StageTool` port.

mod command;

pub use command::CommandTool;
