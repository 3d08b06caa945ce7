use thiserror::Error;

/// Errors that can occur when building criteria from user input
#[derive(Debug, Error, PartialEq)]
pub enum FilterParseError {
    #[error("Invalid status code: '{0}'. Expected an integer between 0 and 65535")]
    InvalidStatus(String),

    #[error("Invalid status class: '{0}'. Expected a single digit 1-9")]
    InvalidStatusClass(String),

    #[error("Invalid clock bound: '{0}'. Expected HH:MM or HH:MM:SS")]
    InvalidClock(String),

    #[error("Invalid number for '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid time mode: '{0}'. Valid modes are: clock, seconds")]
    InvalidTimeMode(String),

    #[error("Invalid comparison: '{0}'. Valid values are: gte, lte")]
    InvalidComparison(String),
}
