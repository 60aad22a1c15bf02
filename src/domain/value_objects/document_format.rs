//! Document format value object - how a template or value set file is read and written

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::closest;

/// Format of a template document, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// JSON, including Terraform's `.tf.json`
    Json,
    Toml,
    Yaml,
    /// Anything else (`.tf`, `.hcl`, `.tpl`): the whole file is one text leaf
    Text,
}

impl DocumentFormat {
    /// Detect a template format from a file path.
    pub fn for_template(path: &Path) -> Self {
        match extension(path).as_deref() {
            Some("json") => DocumentFormat::Json,
            Some("toml") => DocumentFormat::Toml,
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Text,
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, DocumentFormat::Text)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Toml => "toml",
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// Format of an environment value set file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSetFormat {
    /// HCL-style `key = value` lines
    Tfvars,
    Toml,
    Json,
}

impl ValueSetFormat {
    pub const EXTENSIONS: [&'static str; 3] = [".tfvars", ".toml", ".json"];

    /// Detect a value set format from a file path.
    ///
    /// Returns the closest supported extension as `Err(Some(..))` when the
    /// extension is unknown but near a supported one (e.g. `.tfvar`).
    pub fn for_path(path: &Path) -> Result<Self, Option<&'static str>> {
        let ext = extension(path).unwrap_or_default();
        match ext.as_str() {
            "tfvars" => Ok(ValueSetFormat::Tfvars),
            "toml" => Ok(ValueSetFormat::Toml),
            "json" => Ok(ValueSetFormat::Json),
            _ => Err(Self::suggest(&format!(".{}", ext))),
        }
    }

    fn suggest(ext: &str) -> Option<&'static str> {
        closest(ext, &Self::EXTENSIONS)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
