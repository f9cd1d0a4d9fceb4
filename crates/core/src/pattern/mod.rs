//! Date-template filename patterns.
//!
//! A template such as `traffic_%Y%m%d.csv` serves two purposes: rendering
//! the filename for a given day, and recognizing filenames written on earlier
//! days so their date can be recovered.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use datesync_core::pattern::DateTemplate;
//!
//! let template = DateTemplate::parse("report_%Y%m%d.csv");
//! let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! assert_eq!(template.render(day), "report_20240115.csv");
//!
//! let matcher = template.compile();
//! let parts = matcher.captures("report_20240101.csv").unwrap();
//! assert_eq!(parts.to_date().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! assert!(matcher.captures("report_latest.csv").is_none());
//! ```

mod error;
mod matcher;
mod template;

pub use error::DateError;
pub use matcher::{DateMatcher, DateParts};
pub use template::{DateField, DateTemplate};

/// Compiles a raw template string into a matcher.
pub fn compile(template: &str) -> DateMatcher {
    DateTemplate::parse(template).compile()
}
