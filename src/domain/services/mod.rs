//! Domain Services
//!
//! Stateless operations over domain entities.

pub mod renderer;

pub use renderer::{expand, missing_keys, render, unused_keys, ExpandError};
