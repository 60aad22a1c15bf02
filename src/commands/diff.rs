use std::path::Path;

use anyhow::Result;

use stagecraft::presentation::factory::create_diff_use_case;
use stagecraft::presentation::output::emit;

pub fn cmd_diff(template: &Path, from: &Path, to: &Path, json: bool) -> Result<()> {
    let diff = create_diff_use_case().execute(template, from, to)?;
    let (additions, deletions) = diff.stats();

    if json {
        emit(serde_json::json!({
            "event": "complete",
            "command": "diff",
            "from": diff.from.name(),
            "to": diff.to.name(),
            "changed": diff.has_changes(),
            "additions": additions,
            "deletions": deletions,
            "diff": diff.unified(),
        }))?;
        return Ok(());
    }

    if !diff.has_changes() {
        eprintln!("No differences between {} and {}", diff.from.name(), diff.to.name());
        return Ok(());
    }
    print!("{}", diff.unified());
    eprintln!("+{}, -{}", additions, deletions);
    Ok(())
}
