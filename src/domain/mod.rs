//! Domain Layer
//!
//! Pure logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Template, value set, rendered document, stage
//! - `value_objects/` - Placeholder syntax, formats, triggers, content hash
//! - `services/` - Renderer
//! - `ports/` - Interfaces for external tools and event sinks

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
