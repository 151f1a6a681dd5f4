//! LIKE pattern compilation.

use std::fmt;

use regex::Regex;

/// A LIKE pattern compiled to an anchored regular expression.
///
/// `%` matches any run of characters, `_` matches exactly one. The escape
/// character, when declared, makes the following pattern character literal.
/// Compiled once when the expression tree is built; matching is read-only.
#[derive(Clone)]
pub struct LikePattern {
    pattern: String,
    escape: Option<char>,
    regex: Regex,
}

impl LikePattern {
    pub fn new(pattern: &str, escape: Option<char>) -> Result<Self, regex::Error> {
        let regex = Regex::new(&translate(pattern, escape))?;
        Ok(Self {
            pattern: pattern.to_string(),
            escape,
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written in the selector.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }
}

/// Translate LIKE syntax into regex syntax. A trailing escape character
/// with nothing to escape is dropped.
fn translate(pattern: &str, escape: Option<char>) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");

    let mut buf = [0u8; 4];
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            if let Some(literal) = chars.next() {
                out.push_str(&regex::escape(literal.encode_utf8(&mut buf)));
            }
            continue;
        }
        match c {
            '%' => out.push_str(".*?"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }

    out.push('$');
    out
}

impl fmt::Debug for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LikePattern")
            .field("pattern", &self.pattern)
            .field("escape", &self.escape)
            .finish()
    }
}

impl PartialEq for LikePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.escape == other.escape
    }
}
