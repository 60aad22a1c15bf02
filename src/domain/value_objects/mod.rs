//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod document_format;
mod hash;
pub mod placeholder;
mod trigger;

pub use document_format::{DocumentFormat, ValueSetFormat};
pub use hash::ContentHash;
pub use placeholder::{parse_segments, PlaceholderSyntaxError, Segment};
pub use trigger::{RunContext, Trigger, TriggerEvent};
