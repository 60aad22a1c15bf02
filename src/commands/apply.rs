use std::path::{Path, PathBuf};

use anyhow::Result;

use stagecraft::config::{EnvVars, DEFAULT_WORKDIR};
use stagecraft::infrastructure::{AuditLog, CommandTool};
use stagecraft::presentation::factory::{create_command_tool, create_document_use_case};
use stagecraft::presentation::output::emit;

pub fn cmd_apply(
    template: &Path,
    values: &Path,
    config: Option<&Path>,
    vars: &EnvVars,
    json: bool,
) -> Result<()> {
    let (tool, workdir) = match config {
        Some(path) => {
            let config = super::load_config(path, vars, json)?;
            (create_command_tool(&config, vars), config.workdir_path())
        }
        None => {
            let output = template
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "rendered".to_string());
            (CommandTool::new(output), PathBuf::from(DEFAULT_WORKDIR))
        }
    };

    let audit = AuditLog::in_dir(&workdir);
    let rendered =
        create_document_use_case().apply(template, values, &tool, &workdir, Some(&audit))?;
    let identity = rendered.document.identity();

    if json {
        emit(serde_json::json!({
            "event": "complete",
            "command": "apply",
            "status": "success",
            "identity": identity,
            "digest": rendered.document.digest().as_str(),
        }))?;
    } else {
        println!("{}", identity);
    }
    Ok(())
}
