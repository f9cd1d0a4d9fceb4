//! Error types for the pattern module.

use thiserror::Error;

use super::template::DateField;

/// Why a filename that has the template's shape does not yield a date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The template does not carry this field, so no full date exists.
    #[error("template has no {0} field")]
    MissingField(DateField),

    /// The fields do not form a calendar date.
    #[error("{year:04}-{month:02}-{day:02} is not a valid date")]
    InvalidDate { year: i32, month: u32, day: u32 },
}
