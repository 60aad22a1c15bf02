//! Configuration loading and validation

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StagecraftError, StagecraftResult};

use super::env_validator::closest;
use super::types::PipelineConfig;

/// Snapshot of environment variables, captured once by the entry point
pub type EnvVars = BTreeMap<String, String>;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> StagecraftResult<(PipelineConfig, Vec<ConfigWarning>)> {
    if !path.exists() {
        return Err(StagecraftError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = String::from_utf8(fs::read(path)?).map_err(|e| StagecraftError::Config {
        file: path.to_path_buf(),
        message: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let mut config: PipelineConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StagecraftError::Config {
        file: path.to_path_buf(),
        message: e.to_string().trim_end().to_string(),
    })?;

    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    validate(&config).map_err(|message| StagecraftError::Config {
        file: path.to_path_buf(),
        message,
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect::<Vec<_>>();

    for warning in &warnings {
        tracing::warn!(key = %warning.key, file = %warning.file.display(), "unknown config key");
    }

    Ok((config, warnings))
}

/// Apply `STAGECRAFT_*` overrides taken from `vars`
pub fn with_env_overrides(mut config: PipelineConfig, vars: &EnvVars) -> PipelineConfig {
    // STAGECRAFT_WORKDIR
    if let Some(workdir) = vars.get("STAGECRAFT_WORKDIR").filter(|v| !v.is_empty()) {
        config.workdir = PathBuf::from(workdir);
    }

    // STAGECRAFT_PASS_ENV (comma-separated, appended)
    if let Some(extra) = vars.get("STAGECRAFT_PASS_ENV") {
        for name in extra.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !config.tool.pass_env.iter().any(|n| n == name) {
                config.tool.pass_env.push(name.to_string());
            }
        }
    }

    config
}

fn validate(config: &PipelineConfig) -> Result<(), String> {
    if config.stages.is_empty() {
        return Err("at least one [[stage]] is required".to_string());
    }

    let mut seen = HashSet::new();
    for stage in &config.stages {
        if stage.name.trim().is_empty() {
            return Err("stage name must not be empty".to_string());
        }
        if !is_plain_name(&stage.name) {
            return Err(format!(
                "stage name '{}' must not contain path separators or be '.' or '..'",
                stage.name
            ));
        }
        if !seen.insert(stage.name.as_str()) {
            return Err(format!("duplicate stage name '{}'", stage.name));
        }
        stage
            .trigger
            .validate()
            .map_err(|e| format!("stage '{}': {}", stage.name, e))?;
    }

    let commands = [
        ("tool.prepare", &config.tool.prepare),
        ("tool.validate", &config.tool.validate),
        ("tool.apply", &config.tool.apply),
    ];
    for (key, argv) in commands {
        if matches!(argv, Some(args) if args.is_empty() || args[0].trim().is_empty()) {
            return Err(format!("{} must name a program", key));
        }
    }

    if let Some(output) = &config.output {
        if output.is_empty() || !is_plain_name(output) {
            return Err(format!("output '{}' must be a plain file name", output));
        }
    }

    Ok(())
}

/// A single path component that stays inside the directory it is joined to
fn is_plain_name(name: &str) -> bool {
    !matches!(name, "." | "..") && !name.contains(['/', '\\', ':']) && !name.contains('\0')
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "template", "workdir", "output", "tool", "prepare", "validate", "apply", "pass_env",
        "stage", "name", "values", "trigger", "branches", "events", "gate",
    ];

    closest(unknown, CANDIDATES).map(str::to_string)
}
