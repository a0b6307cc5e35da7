//! Display formats attached to worksheet columns.
//!
//! A format is a spreadsheet-style text section: every unquoted `@` stands for
//! the cell text, double-quoted runs and `\`-escaped characters are literal.
//! Patterns without a placeholder, and the `General` pattern, leave the text
//! as stored.

use std::{fmt, sync::Arc};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Text,
}

/// Parsed display format for one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayFormat {
    pattern: Arc<str>,
    segments: Vec<Segment>,
}

impl DisplayFormat {
    pub fn new(pattern: impl Into<Arc<str>>) -> Self {
        let pattern = pattern.into();
        let segments = if pattern.eq_ignore_ascii_case("general") {
            Vec::new()
        } else {
            parse_segments(&pattern)
        };
        Self { pattern, segments }
    }

    /// The pattern as stored in the worksheet metadata.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Renders `text` through the pattern.
    pub fn apply(&self, text: &str) -> String {
        if !self.segments.contains(&Segment::Text) {
            return text.to_owned();
        }
        let mut out = String::with_capacity(self.pattern.len() + text.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Text => out.push_str(text),
            }
        }
        out
    }
}

fn parse_segments(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut quoted = false;
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => quoted = !quoted,
            '\\' if !quoted => {
                if let Some(escaped) = chars.next() {
                    literal.push(escaped);
                }
            }
            '@' if !quoted => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Text);
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
