//! File-backed Environment Value Sets

use std::fmt;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value as JsonValue;

use crate::domain::entities::ValueSet;
use crate::domain::ports::ValueSetRepository;
use crate::domain::value_objects::ValueSetFormat;
use crate::error::{StagecraftError, StagecraftResult};

use super::tfvars;

/// Loads one environment's value set from `.tfvars`, `.toml` or `.json`
#[derive(Debug, Default, Clone, Copy)]
pub struct FsValueSetRepository;

impl FsValueSetRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ValueSetRepository for FsValueSetRepository {
    /// Load the value set at `path`, named after the file stem.
    fn load(&self, path: &Path) -> StagecraftResult<ValueSet> {
        let format = ValueSetFormat::for_path(path).map_err(|suggestion| {
            StagecraftError::UnsupportedFormat {
                file: path.to_path_buf(),
                suggestion: suggestion.map(str::to_string),
            }
        })?;

        if !path.is_file() {
            return Err(StagecraftError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let source = super::read_source(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let parse_error = |message: String| StagecraftError::Parse {
            file: path.to_path_buf(),
            message,
        };

        let pairs = match format {
            ValueSetFormat::Tfvars => tfvars::parse(&source),
            ValueSetFormat::Toml => toml_pairs(&source),
            ValueSetFormat::Json => json_pairs(&source),
        }
        .map_err(parse_error)?;

        let set = ValueSet::from_pairs(name, pairs).map_err(parse_error)?;
        tracing::debug!(value_set = %set.name(), keys = set.len(), "loaded value set");
        Ok(set)
    }
}

fn toml_pairs(source: &str) -> Result<Vec<(String, String)>, String> {
    let table: toml::Table = toml::from_str(source).map_err(|e| e.to_string().trim_end().to_string())?;
    table
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Datetime(d) => d.to_string(),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(scalar_required(&key));
                }
            };
            Ok((key, text))
        })
        .collect()
}

fn json_pairs(source: &str) -> Result<Vec<(String, String)>, String> {
    let FlatEntries(entries) = serde_json::from_str(source).map_err(|e| e.to_string())?;
    entries
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                JsonValue::String(s) => s,
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(scalar_required(&key));
                }
            };
            Ok((key, text))
        })
        .collect()
}

fn scalar_required(key: &str) -> String {
    format!("value of '{}' must be a string, number or bool", key)
}

/// Top-level JSON object entries in file order, duplicates included
struct FlatEntries(Vec<(String, JsonValue)>);

impl<'de> Deserialize<'de> for FlatEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = FlatEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of key/value pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FlatEntries, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, JsonValue>()? {
                    entries.push((key, value));
                }
                Ok(FlatEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
