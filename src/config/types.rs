//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Stage, StageGate};
use crate::domain::value_objects::Trigger;
use crate::error::StagecraftResult;

use super::loader::{self, ConfigWarning, EnvVars};

/// Default config file name
pub const CONFIG_FILE: &str = "stagecraft.toml";

/// Default working directory, relative to the config file
pub const DEFAULT_WORKDIR: &str = ".stagecraft";

fn default_workdir() -> PathBuf {
    PathBuf::from(DEFAULT_WORKDIR)
}

/// External tool commands, each an argv list
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ToolConfig {
    /// Runs once per stage before validation (e.g. `terraform init`)
    #[serde(default)]
    pub prepare: Option<Vec<String>>,

    /// Dry run; omitted means rendering is the only validation
    #[serde(default)]
    pub validate: Option<Vec<String>>,

    /// Apply; omitted means apply only writes the rendered document
    #[serde(default)]
    pub apply: Option<Vec<String>>,

    /// Environment variables forwarded to the tool (e.g. `FASTLY_API_KEY`)
    #[serde(default)]
    pub pass_env: Vec<String>,
}

/// One `[[stage]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageConfig {
    pub name: String,

    /// Value set file, relative to the config file
    pub values: PathBuf,

    #[serde(default)]
    pub trigger: Trigger,

    #[serde(default)]
    pub gate: StageGate,
}

/// Pipeline configuration (`stagecraft.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Template file, relative to the config file
    pub template: PathBuf,

    /// Working directory for rendered documents and the audit log
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// File name each rendered document is written as (default: template file name)
    #[serde(default)]
    pub output: Option<String>,

    #[serde(default)]
    pub tool: ToolConfig,

    #[serde(default, rename = "stage")]
    pub stages: Vec<StageConfig>,

    /// Directory the config was loaded from; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> StagecraftResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> StagecraftResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply `STAGECRAFT_*` overrides from an explicit variable snapshot
    pub fn with_env_overrides(self, vars: &EnvVars) -> Self {
        loader::with_env_overrides(self, vars)
    }

    /// Resolve `path` against the config file's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.template)
    }

    pub fn workdir_path(&self) -> PathBuf {
        self.resolve(&self.workdir)
    }

    /// File name rendered documents are written as
    pub fn output_file_name(&self) -> String {
        self.output.clone().unwrap_or_else(|| {
            self.template
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "rendered".to_string())
        })
    }

    /// Stages in declared order, with value paths resolved
    pub fn stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .map(|s| {
                Stage::new(s.name.clone(), self.resolve(&s.values))
                    .with_trigger(s.trigger.clone())
                    .with_gate(s.gate)
            })
            .collect()
    }
}
