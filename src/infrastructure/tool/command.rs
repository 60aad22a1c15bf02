//! Command Tool
//!
//! Runs configured argv commands (e.g. `terraform plan`) against a rendered
//! document written to `<workdir>/<output file>`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use crate::config::{EnvVars, ToolConfig};
use crate::domain::entities::ValueSet;
use crate::domain::ports::{StageTool, ToolReport, ToolRequest};
use crate::domain::services::expand;
use crate::error::{StagecraftError, StagecraftResult};

/// Variables forwarded to every tool when present in the snapshot
const BASE_ENV: &[&str] = &["PATH", "HOME"];

/// Stage tool backed by child processes
///
/// The child environment is cleared and rebuilt from the variables given to
/// the tool; nothing is inherited from the calling process.
#[derive(Debug, Clone, Default)]
pub struct CommandTool {
    output_file: String,
    prepare: Option<Vec<String>>,
    validate: Option<Vec<String>>,
    apply: Option<Vec<String>>,
    env: EnvVars,
}

impl CommandTool {
    /// Tool with no commands: validation and apply only write the document.
    pub fn new(output_file: impl Into<String>) -> Self {
        Self {
            output_file: output_file.into(),
            ..Self::default()
        }
    }

    /// Build from `[tool]` config, forwarding `PATH`, `HOME` and each
    /// `pass_env` name found in `vars`.
    pub fn from_config(config: &ToolConfig, output_file: impl Into<String>, vars: &EnvVars) -> Self {
        let mut tool = Self::new(output_file);
        tool.prepare = config.prepare.clone();
        tool.validate = config.validate.clone();
        tool.apply = config.apply.clone();

        for name in BASE_ENV
            .iter()
            .copied()
            .chain(config.pass_env.iter().map(String::as_str))
        {
            match vars.get(name) {
                Some(value) => {
                    tool.env.insert(name.to_string(), value.clone());
                }
                None if !BASE_ENV.contains(&name) => {
                    tracing::warn!(variable = %name, "pass_env variable is not set");
                }
                None => {}
            }
        }
        tool
    }

    pub fn with_prepare(mut self, argv: Vec<String>) -> Self {
        self.prepare = Some(argv);
        self
    }

    pub fn with_validate(mut self, argv: Vec<String>) -> Self {
        self.validate = Some(argv);
        self
    }

    pub fn with_apply(mut self, argv: Vec<String>) -> Self {
        self.apply = Some(argv);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Write the document and return its absolute path.
    fn materialize(&self, request: &ToolRequest<'_>) -> StagecraftResult<PathBuf> {
        fs::create_dir_all(request.workdir)?;
        let dir = fs::canonicalize(request.workdir)?;
        let path = dir.join(&self.output_file);
        // Tools never observe a half-written document
        let mut staged = NamedTempFile::new_in(&dir)?;
        staged.write_all(request.document.content().as_bytes())?;
        staged.persist(&path).map_err(|e| e.error)?;
        tracing::debug!(stage = %request.stage, path = %path.display(), "wrote rendered document");
        Ok(path)
    }

    fn run(
        &self,
        argv: Option<&Vec<String>>,
        request: &ToolRequest<'_>,
    ) -> StagecraftResult<ToolReport> {
        let file = self.materialize(request)?;
        let Some(argv) = argv else {
            return Ok(ToolReport::success().with_output(format!("wrote {}", file.display())));
        };

        let args = expand_args(argv, request, &file)?;
        let Some((program, rest)) = args.split_first() else {
            return Err(StagecraftError::Tool {
                program: String::new(),
                message: "empty command".to_string(),
            });
        };

        tracing::info!(stage = %request.stage, command = %args.join(" "), "running tool");
        let output = Command::new(program)
            .args(rest)
            .current_dir(request.workdir)
            .env_clear()
            .envs(&self.env)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StagecraftError::Tool {
                program: program.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(program = %program, code = ?output.status.code(), "tool finished");

        let combined = format!("{}{}", stdout, stderr);
        if output.status.success() {
            return Ok(ToolReport::success().with_output(combined));
        }

        let source = if stderr.trim().is_empty() { &stdout } else { &stderr };
        let mut diagnostics: Vec<String> = source
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        if diagnostics.is_empty() {
            diagnostics.push(match output.status.code() {
                Some(code) => format!("{} exited with status {}", program, code),
                None => format!("{} was terminated by a signal", program),
            });
        }
        Ok(ToolReport::failure(diagnostics).with_output(combined))
    }
}

impl StageTool for CommandTool {
    fn prepare(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        match &self.prepare {
            Some(argv) => self.run(Some(argv), request),
            None => Ok(ToolReport::success()),
        }
    }

    fn validate(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        self.run(self.validate.as_ref(), request)
    }

    fn apply(&self, request: &ToolRequest<'_>) -> StagecraftResult<ToolReport> {
        self.run(self.apply.as_ref(), request)
    }
}

/// Expand `${stage}`, `${file}`, `${workdir}` and `${digest}` in each argument.
fn expand_args(
    argv: &[String],
    request: &ToolRequest<'_>,
    file: &Path,
) -> StagecraftResult<Vec<String>> {
    let program = argv.first().cloned().unwrap_or_default();
    let tool_error = |message: String| StagecraftError::Tool {
        program: program.clone(),
        message,
    };

    let vars = ValueSet::from_pairs(
        "tool",
        [
            ("stage", request.stage.to_string()),
            ("file", file.display().to_string()),
            (
                "workdir",
                file.parent().unwrap_or(request.workdir).display().to_string(),
            ),
            ("digest", request.document.digest().as_str().to_string()),
        ],
    )
    .map_err(tool_error)?;

    argv.iter()
        .map(|arg| expand(arg, &vars).map_err(|e| tool_error(e.to_string())))
        .collect()
}
