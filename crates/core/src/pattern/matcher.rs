//! Compiled template matchers and the date parts they extract.

use chrono::NaiveDate;
use regex_lite::Regex;

use super::error::DateError;
use super::template::DateField;

/// Date fields pulled out of a filename. Fields the template does not carry
/// are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DateParts {
    /// Builds a calendar date from the extracted fields.
    pub fn to_date(&self) -> Result<NaiveDate, DateError> {
        let year = self.year.ok_or(DateError::MissingField(DateField::Year))?;
        let month = self.month.ok_or(DateError::MissingField(DateField::Month))?;
        let day = self.day.ok_or(DateError::MissingField(DateField::Day))?;

        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateError::InvalidDate { year, month, day })
    }
}

/// Anchored matcher compiled from a [`DateTemplate`](super::DateTemplate).
#[derive(Debug, Clone)]
pub struct DateMatcher {
    regex: Regex,
    fields: Vec<DateField>,
}

impl DateMatcher {
    pub(super) fn new(regex: Regex, fields: Vec<DateField>) -> Self {
        Self { regex, fields }
    }

    /// Whether `filename` has the template's shape.
    pub fn is_match(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }

    /// Extracts the date fields from `filename`, or `None` when it does not
    /// have the template's shape.
    pub fn captures(&self, filename: &str) -> Option<DateParts> {
        let caps = self.regex.captures(filename)?;
        let mut parts = DateParts::default();

        for field in &self.fields {
            let Some(text) = caps.name(field.name()).map(|m| m.as_str()) else {
                continue;
            };
            // Captures are fixed-width ASCII digits, at most four of them.
            match field {
                DateField::Day => parts.day = text.parse().ok(),
                DateField::Month => parts.month = text.parse().ok(),
                DateField::Year => parts.year = text.parse().ok(),
            }
        }

        Some(parts)
    }

    /// The regex source, mostly useful in logs.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
