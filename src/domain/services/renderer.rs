//! Renderer
//!
//! Merges a template document with one value set. Pure: the same inputs
//! always produce byte-identical output. Every unresolved placeholder is
//! collected before failing, so one run reports the complete list.

use std::collections::BTreeSet;

use serde_json::{Map, Value as JsonValue};

use crate::domain::entities::{Node, RenderedDocument, Scalar, TemplateDocument, ValueSet};
use crate::domain::value_objects::{parse_segments, DocumentFormat, PlaceholderSyntaxError, Segment};
use crate::error::{StagecraftError, StagecraftResult};

/// Render `template` against `values`.
pub fn render(template: &TemplateDocument, values: &ValueSet) -> StagecraftResult<RenderedDocument> {
    let document = format!("{}@{}", template.name(), values.name());
    let mut missing = BTreeSet::new();

    let content = match template.format() {
        DocumentFormat::Text => {
            let text = match template.root() {
                Node::Text(segments) => resolve_segments(segments, values, &mut missing),
                other => {
                    // Hand-built documents may pair the text format with a structured root.
                    let value = resolve_node(other, values, &mut missing);
                    serde_json::to_string_pretty(&value)?
                }
            };
            ensure_resolved(&document, missing)?;
            text
        }
        DocumentFormat::Toml => {
            ensure_resolved(&document, missing_keys(template, values))?;
            let value = resolve_toml(template.root(), values)?;
            toml::to_string_pretty(&value)?
        }
        format => {
            let value = resolve_node(template.root(), values, &mut missing);
            ensure_resolved(&document, missing)?;
            serialize(&value, format)?
        }
    };

    tracing::debug!(
        document = %document,
        bytes = content.len(),
        "rendered template"
    );

    Ok(RenderedDocument::new(
        template.name(),
        values.name(),
        template.format(),
        content,
    ))
}

/// Value-set keys the template never references, sorted
pub fn unused_keys(template: &TemplateDocument, values: &ValueSet) -> Vec<String> {
    let used = template.placeholders();
    values
        .keys()
        .filter(|key| !used.contains(*key))
        .map(str::to_string)
        .collect()
}

/// Placeholders the template references that `values` does not bind, sorted
pub fn missing_keys(template: &TemplateDocument, values: &ValueSet) -> BTreeSet<String> {
    template
        .placeholders()
        .into_iter()
        .filter(|name| !values.contains(name))
        .collect()
}

/// Failure expanding a single string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    Syntax(PlaceholderSyntaxError),
    Unresolved(BTreeSet<String>),
}

impl std::fmt::Display for ExpandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpandError::Syntax(e) => write!(f, "{}", e),
            ExpandError::Unresolved(keys) => write!(
                f,
                "unresolved placeholders: {}",
                keys.iter().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

impl std::error::Error for ExpandError {}

/// Expand the placeholders in a single string.
pub fn expand(text: &str, values: &ValueSet) -> Result<String, ExpandError> {
    let segments = parse_segments(text).map_err(ExpandError::Syntax)?;
    let mut missing = BTreeSet::new();
    let out = resolve_segments(&segments, values, &mut missing);
    if missing.is_empty() {
        Ok(out)
    } else {
        Err(ExpandError::Unresolved(missing))
    }
}

fn ensure_resolved(document: &str, missing: BTreeSet<String>) -> StagecraftResult<()> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(StagecraftError::UnresolvedPlaceholders {
        document: document.to_string(),
        missing,
    })
}

fn resolve_segments(segments: &[Segment], values: &ValueSet, missing: &mut BTreeSet<String>) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => match values.lookup(name) {
                Some(value) => out.push_str(value.as_str()),
                None => {
                    missing.insert(name.clone());
                }
            },
        }
    }
    out
}

fn resolve_node(node: &Node, values: &ValueSet, missing: &mut BTreeSet<String>) -> JsonValue {
    match node {
        Node::Scalar(Scalar::Null) => JsonValue::Null,
        Node::Scalar(Scalar::Bool(b)) => JsonValue::Bool(*b),
        Node::Scalar(Scalar::Number(n)) => JsonValue::Number(n.clone()),
        // JSON and YAML have no datetime type.
        Node::Scalar(Scalar::Datetime(dt)) => JsonValue::String(dt.to_string()),
        Node::Text(segments) => JsonValue::String(resolve_segments(segments, values, missing)),
        Node::List(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| resolve_node(item, values, missing))
                .collect(),
        ),
        Node::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, child) in entries {
                map.insert(key.clone(), resolve_node(child, values, missing));
            }
            JsonValue::Object(map)
        }
    }
}

/// Resolve a tree whose placeholders are all bound into a TOML value.
///
/// Datetimes stay typed. TOML has no null: a null table entry is dropped,
/// anywhere else it is an error.
fn resolve_toml(node: &Node, values: &ValueSet) -> Result<toml::Value, toml::ser::Error> {
    use serde::ser::Error as _;

    Ok(match node {
        Node::Scalar(Scalar::Null) => {
            return Err(toml::ser::Error::custom("null is not representable in TOML"))
        }
        Node::Scalar(Scalar::Bool(b)) => toml::Value::Boolean(*b),
        Node::Scalar(Scalar::Number(n)) => match n.as_i64() {
            Some(i) => toml::Value::Integer(i),
            None => match n.as_f64() {
                Some(f) => toml::Value::Float(f),
                None => return Err(toml::ser::Error::custom(format!("number {} out of range", n))),
            },
        },
        Node::Scalar(Scalar::Datetime(dt)) => toml::Value::Datetime(*dt),
        Node::Text(segments) => {
            toml::Value::String(resolve_segments(segments, values, &mut BTreeSet::new()))
        }
        Node::List(items) => toml::Value::Array(
            items
                .iter()
                .map(|item| resolve_toml(item, values))
                .collect::<Result<_, _>>()?,
        ),
        Node::Map(entries) => {
            let mut table = toml::Table::new();
            for (key, child) in entries {
                if matches!(child, Node::Scalar(Scalar::Null)) {
                    continue;
                }
                table.insert(key.clone(), resolve_toml(child, values)?);
            }
            toml::Value::Table(table)
        }
    })
}

fn serialize(value: &JsonValue, format: DocumentFormat) -> StagecraftResult<String> {
    Ok(match format {
        DocumentFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            out
        }
        DocumentFormat::Toml => toml::to_string_pretty(value)?,
        DocumentFormat::Yaml => serde_yaml_ng::to_string(value)?,
        DocumentFormat::Text => match value {
            JsonValue::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other)?,
        },
    })
}
