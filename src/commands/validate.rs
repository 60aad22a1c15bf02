use std::path::{Path, PathBuf};

use anyhow::Result;

use stagecraft::config::EnvVars;
use stagecraft::domain::ports::StageTool;
use stagecraft::presentation::factory::{create_command_tool, create_document_use_case};
use stagecraft::presentation::output::emit;

pub fn cmd_validate(
    template: &Path,
    values: &Path,
    config: Option<&Path>,
    vars: &EnvVars,
    json: bool,
) -> Result<()> {
    let (tool, workdir) = match config {
        Some(path) => {
            let config = super::load_config(path, vars, json)?;
            (
                Some(create_command_tool(&config, vars)),
                config.workdir_path(),
            )
        }
        None => (None, PathBuf::new()),
    };

    let use_case = create_document_use_case();
    let rendered = use_case.validate(
        template,
        values,
        tool.as_ref().map(|t| t as &dyn StageTool),
        &workdir,
    )?;
    let unused = rendered.unused_keys();

    if json {
        emit(serde_json::json!({
            "event": "complete",
            "command": "validate",
            "status": "success",
            "document": rendered.document.name(),
            "digest": rendered.document.digest().as_str(),
            "unused_keys": unused,
        }))?;
        return Ok(());
    }

    for key in &unused {
        eprintln!(
            "warning: key '{}' in value set '{}' is not used by {}",
            key,
            rendered.values.name(),
            rendered.template.name()
        );
    }
    println!(
        "{} is valid ({})",
        rendered.document.name(),
        rendered.document.digest().short()
    );
    Ok(())
}
