//! Minimal `.tfvars` reader
//!
//! Accepts `key = value` assignments, one per line, where a value is a quoted
//! string, a number or a bool. `#`, `//` and `/* */` comments are skipped.
//! Lists, maps and heredocs are rejected: value sets are flat.

/// Parse `source` into `(key, value)` pairs in file order.
///
/// Numbers and bools are returned in their source spelling. Errors carry a
/// 1-based line number.
pub(super) fn parse(source: &str) -> Result<Vec<(String, String)>, String> {
    Parser {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
    }
    .assignments()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn assignments(&mut self) -> Result<Vec<(String, String)>, String> {
        let mut pairs = Vec::new();
        loop {
            self.skip_trivia(true)?;
            let Some(c) = self.peek() else {
                return Ok(pairs);
            };

            let key = if c == '"' {
                self.quoted()?
            } else {
                self.identifier()?
            };

            self.skip_trivia(false)?;
            if self.peek() != Some('=') {
                return Err(self.error(format!("expected '=' after '{}'", key)));
            }
            self.bump();
            self.skip_trivia(false)?;

            let value = self.value(&key)?;
            self.skip_trivia(false)?;
            match self.peek() {
                None | Some('\n') => {}
                Some(other) => {
                    return Err(self.error(format!(
                        "unexpected '{}' after value of '{}'",
                        other, key
                    )))
                }
            }
            pairs.push((key, value));
        }
    }

    fn value(&mut self, key: &str) -> Result<String, String> {
        match self.peek() {
            Some('"') => self.quoted(),
            Some('[') | Some('{') | Some('<') => Err(self.error(format!(
                "value of '{}' must be a string, number or bool",
                key
            ))),
            None | Some('\n') => Err(self.error(format!("missing value for '{}'", key))),
            Some(_) => {
                let token = self.take_while(|c| c.is_ascii_alphanumeric() || "._-+".contains(c));
                if token == "true" || token == "false" || is_number(&token) {
                    Ok(token)
                } else if token.is_empty() {
                    let found = self.peek().unwrap_or(' ');
                    Err(self.error(format!("unexpected '{}' in value of '{}'", found, key)))
                } else {
                    Err(self.error(format!(
                        "unquoted value '{}' for '{}' is not a number or bool",
                        token, key
                    )))
                }
            }
        }
    }

    fn identifier(&mut self) -> Result<String, String> {
        let ident = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if ident.is_empty() {
            let found = self.peek().unwrap_or(' ');
            return Err(self.error(format!("expected a key, found '{}'", found)));
        }
        Ok(ident)
    }

    fn quoted(&mut self) -> Result<String, String> {
        let start_line = self.line;
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(format!("line {}: unterminated string", start_line));
                }
                Some('"') => {
                    self.bump();
                    return Ok(out);
                }
                Some('\\') => {
                    self.bump();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some(other) => {
                            return Err(self.error(format!("invalid escape '\\{}'", other)))
                        }
                        None => return Err(format!("line {}: unterminated string", start_line)),
                    };
                    self.bump();
                    out.push(escaped);
                }
                Some(c) => {
                    self.bump();
                    out.push(c);
                }
            }
        }
    }

    /// Skip whitespace and comments; newlines only when `newlines` is set.
    fn skip_trivia(&mut self, newlines: bool) -> Result<(), String> {
        while let Some(c) = self.peek() {
            match c {
                '\n' if newlines => self.bump(),
                c if c.is_whitespace() && c != '\n' => self.bump(),
                '#' => self.skip_to_eol(),
                '/' if self.peek_at(1) == Some('/') => self.skip_to_eol(),
                '/' if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_to_eol(&mut self) {
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), String> {
        let start_line = self.line;
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => return Err(format!("line {}: unterminated block comment", start_line)),
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return Ok(());
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            out.push(c);
            self.bump();
        }
        out
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if self.peek() == Some('\n') {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn error(&self, message: String) -> String {
        format!("line {}: {}", self.line, message)
    }
}

fn is_number(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || "+-.".contains(c))
        && token.parse::<f64>().is_ok()
}
