//! Configuration module for Stagecraft
//!
//! Resolution order for pipeline settings:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (`STAGECRAFT_*`), passed in as a snapshot
//! 3. Pipeline config (`stagecraft.toml`)
//! 4. Built-in defaults (lowest priority)

mod context;
mod env_validator;
mod loader;
mod types;

pub use context::resolve_run_context;
pub use env_validator::{closest, levenshtein, EnvVarValidator};
pub use loader::{ConfigWarning, EnvVars};
pub use types::{PipelineConfig, StageConfig, ToolConfig, CONFIG_FILE, DEFAULT_WORKDIR};
