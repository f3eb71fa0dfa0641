//! Error types for calendar-timestamp operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Unknown timezone: '{0}'")]
    UnknownTimezone(String),

    #[error("Invalid local time: {0}")]
    InvalidLocalTime(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
