use std::path::Path;

use anyhow::Result;

use stagecraft::domain::ports::TemplateRepository;
use stagecraft::infrastructure::FsTemplateStore;
use stagecraft::presentation::output::emit;

pub fn cmd_placeholders(template: &Path, json: bool) -> Result<()> {
    let template = FsTemplateStore::new().load(template)?;
    let names = template.placeholders();

    if json {
        emit(serde_json::json!({
            "event": "complete",
            "command": "placeholders",
            "template": template.name(),
            "placeholders": names,
        }))?;
        return Ok(());
    }

    for name in names {
        println!("{}", name);
    }
    Ok(())
}
