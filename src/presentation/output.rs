//! Output helpers
//!
//! NDJSON events for `--json` and error rendering for humans.

use std::io::{self, Write};

use crate::config::ConfigWarning;
use crate::error::StagecraftError;

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &serde_json::Value) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(event: serde_json::Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, &event)
}

/// Human-readable config warning
pub fn format_warning(warning: &ConfigWarning) -> String {
    let location = match warning.line {
        Some(line) => format!("{}:{}", warning.file.display(), line),
        None => warning.file.display().to_string(),
    };
    match &warning.suggestion {
        Some(s) => format!(
            "warning: unknown key '{}' in {} (did you mean '{}'?)",
            warning.key, location, s
        ),
        None => format!("warning: unknown key '{}' in {}", warning.key, location),
    }
}

/// JSON error event for a failed command
pub fn error_event(command: &str, err: &anyhow::Error) -> serde_json::Value {
    let mut event = serde_json::json!({
        "event": "error",
        "command": command,
        "message": err.to_string(),
    });
    if let Some(stage) = err
        .downcast_ref::<StagecraftError>()
        .and_then(StagecraftError::stage)
    {
        event["stage"] = serde_json::Value::String(stage.to_string());
    }
    event
}

/// Format an error and its causes for stderr
pub fn format_error(err: &anyhow::Error) -> String {
    let mut out = format!("Error: {}\n", err);
    for cause in err.chain().skip(1) {
        out.push_str(&format!("  caused by: {}\n", cause));
    }
    out
}

/// Exit code for an error that reached the entry point
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<StagecraftError>()
        .map(StagecraftError::exit_code)
        .unwrap_or(1)
}
