use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use stagecraft::presentation::factory::create_document_use_case;
use stagecraft::presentation::output::emit;

pub fn cmd_render(template: &Path, values: &Path, out: Option<&Path>, json: bool) -> Result<()> {
    let rendered = create_document_use_case().render(template, values)?;
    let document = &rendered.document;

    if let Some(out) = out {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(out, document.content())
            .with_context(|| format!("failed to write {}", out.display()))?;
    }

    if json {
        let mut event = serde_json::json!({
            "event": "complete",
            "command": "render",
            "document": document.name(),
            "digest": document.digest().as_str(),
        });
        match out {
            Some(path) => event["path"] = serde_json::json!(path.display().to_string()),
            None => event["content"] = serde_json::json!(document.content()),
        }
        emit(event)?;
        return Ok(());
    }

    match out {
        Some(path) => eprintln!("Wrote {} to {}", document.identity(), path.display()),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.content().as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
