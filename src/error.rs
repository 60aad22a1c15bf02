//! Error types for Stagecraft
//!
//! Library code returns `StagecraftError` (built with `thiserror`); the binary
//! wraps it in `anyhow` at the edge.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Stagecraft operations
pub type StagecraftResult<T> = Result<T, StagecraftError>;

/// Main error type for Stagecraft operations
#[derive(Error, Debug)]
pub enum StagecraftError {
    /// Template, value set or config file does not exist
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// Document is not well-formed
    #[error("failed to parse {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// File extension is not a supported document format
    #[error("unsupported file format for {file}{}", suggestion_suffix(.suggestion))]
    UnsupportedFormat {
        file: PathBuf,
        suggestion: Option<String>,
    },

    /// Lookup of a single key in a value set failed
    #[error("missing key '{key}' in value set '{value_set}'")]
    MissingKey { key: String, value_set: String },

    /// Rendering found placeholders with no binding (all of them, sorted)
    #[error("unresolved placeholders in {document}: {}", join_keys(.missing))]
    UnresolvedPlaceholders {
        document: String,
        missing: BTreeSet<String>,
    },

    /// One or more stages could not be rendered before the pipeline started
    #[error("preflight failed for {} stage(s):\n{}", .failures.len(), format_failures(.failures))]
    Preflight { failures: Vec<StageFailure> },

    /// External dry-run rejected the rendered document
    #[error("validation failed for stage '{stage}'{}", diagnostics_suffix(.diagnostics))]
    ValidationFailed {
        stage: String,
        diagnostics: Vec<String>,
    },

    /// External apply rejected or partially applied the rendered document
    #[error("apply failed for stage '{stage}'{}", diagnostics_suffix(.diagnostics))]
    ApplyFailed {
        stage: String,
        diagnostics: Vec<String>,
    },

    /// Pipeline configuration is invalid
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// External tool could not be started
    #[error("failed to run '{program}': {message}")]
    Tool { program: String, message: String },

    /// Run stopped by an interrupt before all stages finished
    #[error("pipeline interrupted before stage '{next_stage}'")]
    Interrupted { next_stage: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StagecraftError {
    /// Stage name carried by stage-level failures
    pub fn stage(&self) -> Option<&str> {
        match self {
            StagecraftError::ValidationFailed { stage, .. }
            | StagecraftError::ApplyFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Process exit code for this error
    ///
    /// Usage and configuration problems exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            StagecraftError::Config { .. } | StagecraftError::UnsupportedFormat { .. } => 2,
            _ => 1,
        }
    }
}

/// A single stage that failed preflight rendering
#[derive(Debug)]
pub struct StageFailure {
    pub stage: String,
    pub error: StagecraftError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage '{}': {}", self.stage, self.error)
    }
}

fn join_keys(keys: &BTreeSet<String>) -> String {
    keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

fn diagnostics_suffix(diagnostics: &[String]) -> String {
    if diagnostics.is_empty() {
        return String::new();
    }
    let mut out = String::from(":");
    for line in diagnostics {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}

fn format_failures(failures: &[StageFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}
