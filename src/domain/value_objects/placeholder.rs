//! Placeholder syntax
//!
//! A text leaf is split into literal runs and named placeholders:
//!
//! - `${NAME}` and `${var.NAME}` are placeholders named `NAME`
//! - `$${` renders as a literal `${`
//! - any other `${ ... }` expression is kept verbatim, so native Terraform
//!   interpolations such as `${fastly_service_v1.app.id}` pass through

use std::fmt;

/// One piece of a text leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

impl Segment {
    pub fn placeholder_name(&self) -> Option<&str> {
        match self {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        }
    }
}

/// Unterminated `${` in a text leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSyntaxError {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for PlaceholderSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unterminated '${{' at line {}, column {}",
            self.line, self.column
        )
    }
}

impl std::error::Error for PlaceholderSyntaxError {}

const VAR_PREFIX: &str = "var.";

/// Returns true if `name` can be used as a placeholder name.
pub fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Split `input` into segments. Adjacent literal runs are merged.
pub fn parse_segments(input: &str) -> Result<Vec<Segment>, PlaceholderSyntaxError> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < bytes.len() {
        if input[i..].starts_with("$${") {
            literal.push_str("${");
            i += 3;
            continue;
        }

        if input[i..].starts_with("${") {
            let body_start = i + 2;
            let body_end = find_closing_brace(input, body_start)
                .ok_or_else(|| syntax_error_at(input, i))?;
            let body = &input[body_start..body_end];

            match placeholder_in(body) {
                Some(name) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
                None => literal.push_str(&input[i..=body_end]),
            }
            i = body_end + 1;
            continue;
        }

        // Advance one full character
        let ch = input[i..].chars().next().unwrap_or_default();
        literal.push(ch);
        i += ch.len_utf8().max(1);
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Returns true if `input` contains at least one placeholder.
///
/// Malformed input counts as placeholder-free; parsing reports it instead.
pub fn contains_placeholder(input: &str) -> bool {
    parse_segments(input)
        .map(|segments| segments.iter().any(|s| s.placeholder_name().is_some()))
        .unwrap_or(false)
}

fn placeholder_in(body: &str) -> Option<&str> {
    let trimmed = body.trim();
    let name = trimmed.strip_prefix(VAR_PREFIX).unwrap_or(trimmed);
    is_placeholder_name(name).then_some(name)
}

/// Index of the `}` closing an expression starting at `start`, honouring nested braces.
fn find_closing_brace(input: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in input[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(start + offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn syntax_error_at(input: &str, offset: usize) -> PlaceholderSyntaxError {
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    PlaceholderSyntaxError { line, column }
}
