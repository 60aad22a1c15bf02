//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `repositories/` - Template and value set loading from disk
//! - `tool/` - External validate/apply tool (child processes)
//! - `events/` - Pipeline event sinks (console, NDJSON)
//! - `audit` - Append-only apply log

pub mod audit;
pub mod events;
pub mod repositories;
pub mod tool;

pub use audit::{AuditLog, AuditRecord};
pub use events::{ConsoleEventSink, JsonEventSink};
pub use repositories::{FsTemplateStore, FsValueSetRepository};
pub use tool::CommandTool;
