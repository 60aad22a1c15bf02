//! Apply audit log
//!
//! One NDJSON record per apply attempt, appended to `<workdir>/audit.log`.
//! Every applied document is kept under `<workdir>/<stage>/history/`, named
//! by its short digest, so a known-good document can be re-applied by hand.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{RenderedDocument, StageStatus};
use crate::error::StagecraftResult;

/// Audit log file name inside the workdir
pub const AUDIT_FILE: &str = "audit.log";

/// Per-stage directory holding every document handed to apply
pub const HISTORY_DIR: &str = "history";

/// One apply attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub stage: String,
    pub identity: String,
    pub digest: String,
    /// `applied` or `apply_failed`
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    /// Archived copy of the document, relative to the workdir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl AuditRecord {
    pub fn new(
        at: DateTime<Utc>,
        stage: &str,
        document: &RenderedDocument,
        outcome: StageStatus,
        diagnostics: Vec<String>,
    ) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            stage: stage.to_string(),
            identity: document.identity(),
            digest: document.digest().as_str().to_string(),
            outcome: outcome.as_str().to_string(),
            diagnostics,
            document: None,
        }
    }

    pub fn with_document(mut self, path: impl Into<String>) -> Self {
        self.document = Some(path.into());
        self
    }
}

/// Append-only log of apply attempts
#[derive(Debug, Clone)]
pub struct AuditLog {
    workdir: PathBuf,
    path: PathBuf,
}

impl AuditLog {
    /// Log stored in `workdir`
    pub fn in_dir(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            path: workdir.join(AUDIT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the log (and its directory) if needed.
    pub fn append(&self, record: &AuditRecord) -> StagecraftResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        tracing::debug!(path = %self.path.display(), stage = %record.stage, "appended audit record");
        Ok(())
    }

    /// Keep a copy of `document` as `<stage>/history/<short-digest>.<ext>`
    /// and return that path relative to the workdir.
    ///
    /// Identical content maps to the same file, so re-applying a document
    /// does not duplicate it.
    pub fn archive(&self, stage: &str, document: &RenderedDocument) -> StagecraftResult<String> {
        let file_name = format!(
            "{}.{}",
            document.digest().short_hex(),
            history_extension(document)
        );
        let relative = format!("{}/{}/{}", stage, HISTORY_DIR, file_name);
        let dir = self.workdir.join(stage).join(HISTORY_DIR);
        let target = dir.join(&file_name);
        if !target.exists() {
            fs::create_dir_all(&dir)?;
            fs::write(&target, document.content())?;
            tracing::debug!(path = %target.display(), "archived applied document");
        }
        Ok(relative)
    }

    /// Read every record; a missing log reads as empty.
    pub fn read(&self) -> StagecraftResult<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        fs::read_to_string(&self.path)?
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(Into::into))
            .collect()
    }
}

/// Everything after the first dot of the template name (`tf.json` for
/// `fastly.tf.json`), else the format name.
fn history_extension(document: &RenderedDocument) -> String {
    match document.template().split_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => document.format().to_string(),
    }
}
