//! Template document entity
//!
//! An ordered tree of configuration nodes whose string leaves may contain
//! named placeholders. Parsing is pure; reading the file is the job of the
//! template repository.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::value_objects::{parse_segments, DocumentFormat, Segment};

/// A literal, non-string leaf
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    /// TOML offset/local datetime, date or time
    Datetime(toml::value::Datetime),
}

/// A node in the template tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    /// String leaf made of literal runs and placeholders
    Text(Vec<Segment>),
    List(Vec<Node>),
    /// Ordered key/value pairs; keys are literal
    Map(Vec<(String, Node)>),
}

impl Node {
    /// Literal text leaf with no placeholders
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Node::Text(Vec::new())
        } else {
            Node::Text(vec![Segment::Literal(text)])
        }
    }

    /// Leaf that is exactly one placeholder
    pub fn placeholder(name: impl Into<String>) -> Self {
        Node::Text(vec![Segment::Placeholder(name.into())])
    }

    fn collect_placeholders<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Node::Scalar(_) => {}
            Node::Text(segments) => {
                out.extend(segments.iter().filter_map(Segment::placeholder_name));
            }
            Node::List(items) => items.iter().for_each(|n| n.collect_placeholders(out)),
            Node::Map(entries) => entries
                .iter()
                .for_each(|(_, n)| n.collect_placeholders(out)),
        }
    }
}

/// Error produced while turning source text into a template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParseError {
    pub message: String,
}

impl TemplateParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn at(path: &str, message: impl fmt::Display) -> Self {
        Self::new(format!("at {}: {}", path, message))
    }
}

impl fmt::Display for TemplateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TemplateParseError {}

/// Base configuration document with placeholders intact
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDocument {
    name: String,
    format: DocumentFormat,
    root: Node,
}

impl TemplateDocument {
    pub fn new(name: impl Into<String>, format: DocumentFormat, root: Node) -> Self {
        Self {
            name: name.into(),
            format,
            root,
        }
    }

    /// Parse `source` in the given format.
    pub fn parse(
        name: impl Into<String>,
        format: DocumentFormat,
        source: &str,
    ) -> Result<Self, TemplateParseError> {
        let root = match format {
            DocumentFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(source)
                    .map_err(|e| TemplateParseError::new(e.to_string()))?;
                from_json(&value, "$")?
            }
            DocumentFormat::Toml => {
                let table: toml::Table = toml::from_str(source)
                    .map_err(|e| TemplateParseError::new(e.to_string().trim_end().to_string()))?;
                from_toml(&toml::Value::Table(table), "$")?
            }
            DocumentFormat::Yaml => {
                let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(source)
                    .map_err(|e| TemplateParseError::new(e.to_string()))?;
                from_yaml(&value, "$")?
            }
            DocumentFormat::Text => text_node(source, "$")?,
        };

        Ok(Self::new(name, format, root))
    }

    /// File name the template was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Every distinct placeholder name referenced anywhere in the tree
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.root.collect_placeholders(&mut names);
        names.into_iter().map(str::to_string).collect()
    }
}

fn text_node(text: &str, path: &str) -> Result<Node, TemplateParseError> {
    parse_segments(text)
        .map(Node::Text)
        .map_err(|e| TemplateParseError::at(path, e))
}

fn child_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn from_json(value: &serde_json::Value, path: &str) -> Result<Node, TemplateParseError> {
    use serde_json::Value;

    Ok(match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
        Value::Number(n) => Node::Scalar(Scalar::Number(n.clone())),
        Value::String(s) => text_node(s, path)?,
        Value::Array(items) => Node::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json(item, &index_path(path, i)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Node::Map(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), from_json(v, &child_path(path, k))?)))
                .collect::<Result<_, TemplateParseError>>()?,
        ),
    })
}

fn from_toml(value: &toml::Value, path: &str) -> Result<Node, TemplateParseError> {
    use toml::Value;

    Ok(match value {
        Value::Boolean(b) => Node::Scalar(Scalar::Bool(*b)),
        Value::Integer(i) => Node::Scalar(Scalar::Number((*i).into())),
        Value::Float(f) => Node::Scalar(Scalar::Number(finite_number(*f, path)?)),
        Value::String(s) => text_node(s, path)?,
        Value::Datetime(dt) => Node::Scalar(Scalar::Datetime(*dt)),
        Value::Array(items) => Node::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_toml(item, &index_path(path, i)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Table(table) => Node::Map(
            table
                .iter()
                .map(|(k, v)| Ok((k.clone(), from_toml(v, &child_path(path, k))?)))
                .collect::<Result<_, TemplateParseError>>()?,
        ),
    })
}

fn from_yaml(value: &serde_yaml_ng::Value, path: &str) -> Result<Node, TemplateParseError> {
    use serde_yaml_ng::Value;

    Ok(match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
        Value::Number(n) => Node::Scalar(Scalar::Number(yaml_number(n, path)?)),
        Value::String(s) => text_node(s, path)?,
        Value::Sequence(items) => Node::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_yaml(item, &index_path(path, i)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (k, v) in mapping {
                let key = yaml_key(k, path)?;
                let node = from_yaml(v, &child_path(path, &key))?;
                entries.push((key, node));
            }
            Node::Map(entries)
        }
        Value::Tagged(tagged) => {
            return Err(TemplateParseError::at(
                path,
                format!("tagged values are not supported ({})", tagged.tag),
            ))
        }
    })
}

fn yaml_key(key: &serde_yaml_ng::Value, path: &str) -> Result<String, TemplateParseError> {
    use serde_yaml_ng::Value;

    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(TemplateParseError::at(path, "mapping keys must be scalars")),
    }
}

fn yaml_number(n: &serde_yaml_ng::Number, path: &str) -> Result<serde_json::Number, TemplateParseError> {
    if let Some(i) = n.as_i64() {
        Ok(i.into())
    } else if let Some(u) = n.as_u64() {
        Ok(u.into())
    } else {
        finite_number(n.as_f64().unwrap_or(f64::NAN), path)
    }
}

fn finite_number(f: f64, path: &str) -> Result<serde_json::Number, TemplateParseError> {
    serde_json::Number::from_f64(f)
        .ok_or_else(|| TemplateParseError::at(path, format!("non-finite number {}", f)))
}
