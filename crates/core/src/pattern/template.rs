//! Filename templates with `%d`/`%m`/`%Y` date placeholders.

use chrono::{Datelike, NaiveDate};
use regex_lite::Regex;
use std::fmt;

use super::matcher::DateMatcher;

/// A date field a template can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Day,
    Month,
    Year,
}

impl DateField {
    /// Number of digits the field occupies in a filename.
    pub fn width(self) -> usize {
        match self {
            Self::Day | Self::Month => 2,
            Self::Year => 4,
        }
    }

    /// Capture group name used in the compiled matcher.
    pub fn name(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    fn from_code(code: char) -> Option<Self> {
        match code {
            'd' => Some(Self::Day),
            'm' => Some(Self::Month),
            'Y' => Some(Self::Year),
            _ => None,
        }
    }

    fn value(self, date: NaiveDate) -> i64 {
        match self {
            Self::Day => i64::from(date.day()),
            Self::Month => i64::from(date.month()),
            Self::Year => i64::from(date.year()),
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(DateField),
}

/// A parsed filename template.
///
/// Parsing never fails: `%d`, `%m` and `%Y` are placeholders, `%%` is a
/// literal percent sign, and anything else (including other `%x` codes) is
/// literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl DateTemplate {
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            match chars.peek().copied() {
                Some('%') => {
                    chars.next();
                    literal.push('%');
                }
                Some(code) => match DateField::from_code(code) {
                    Some(field) => {
                        chars.next();
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Field(field));
                    }
                    None => literal.push('%'),
                },
                None => literal.push('%'),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The template as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template carries at least one date placeholder.
    ///
    /// Undated templates name a single fixed file; they have no notion of
    /// staleness and are never swept.
    pub fn is_dated(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(_)))
    }

    /// Substitutes `date` into the template, producing that day's filename.
    pub fn render(&self, date: NaiveDate) -> String {
        let mut out = String::with_capacity(self.raw.len() + 4);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    out.push_str(&format!("{:0width$}", field.value(date), width = field.width()))
                }
            }
        }
        out
    }

    /// Compiles the template into an anchored matcher.
    ///
    /// Literal text is escaped, the first occurrence of each field becomes a
    /// named fixed-width digit capture and later occurrences an uncaptured
    /// run of the same width.
    pub fn compile(&self) -> DateMatcher {
        let mut pattern = String::from("^");
        let mut captured: Vec<DateField> = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex_lite::escape(text)),
                Segment::Field(field) if captured.contains(field) => {
                    pattern.push_str(&format!(r"\d{{{}}}", field.width()));
                }
                Segment::Field(field) => {
                    pattern.push_str(&format!(r"(?P<{}>\d{{{}}})", field.name(), field.width()));
                    captured.push(*field);
                }
            }
        }
        pattern.push('$');

        // Literals are escaped and group names are fixed identifiers, so the
        // pattern is always well-formed.
        let regex = Regex::new(&pattern).expect("escaped template compiles to a valid regex");

        DateMatcher::new(regex, captured)
    }
}

impl fmt::Display for DateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for DateTemplate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
