//! Command handlers, one per subcommand

pub mod apply;
pub mod diff;
pub mod placeholders;
pub mod render;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use stagecraft::config::{EnvVars, PipelineConfig};
use stagecraft::presentation::output::format_warning;

/// Load a pipeline config, report unknown keys on stderr, and apply
/// `STAGECRAFT_*` overrides from `vars`.
pub(crate) fn load_config(path: &Path, vars: &EnvVars, json: bool) -> Result<PipelineConfig> {
    let (config, warnings) = PipelineConfig::load_with_warnings(path)?;
    if !json {
        for warning in &warnings {
            eprintln!("{}", format_warning(warning));
        }
    }
    Ok(config.with_env_overrides(vars))
}
