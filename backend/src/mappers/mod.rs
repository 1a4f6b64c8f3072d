//! Conversions between the `shared` wire/storage DTOs and domain types.
//!
//! DTOs carry dates, times and timestamps as strings; parsing happens here
//! so nothing past this boundary deals with raw text.

pub mod category_mapper;
pub mod person_mapper;
pub mod settings_mapper;
pub mod task_mapper;
pub mod transaction_mapper;

pub use category_mapper::CategoryMapper;
pub use person_mapper::PersonMapper;
pub use settings_mapper::SettingsMapper;
pub use task_mapper::{CompletionMapper, TaskMapper};
pub use transaction_mapper::TransactionMapper;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::domain::errors::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Accepts `HH:MM`, and `HH:MM:SS` for records written by other tools
pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    let value_trimmed = value.trim();
    NaiveTime::parse_from_str(value_trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value_trimmed, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

pub fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ValidationError> {
    value.map(|value| parse_date(field, value)).transpose()
}

pub fn parse_optional_time(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveTime>, ValidationError> {
    value.map(|value| parse_time(field, value)).transpose()
}

pub fn parse_optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    value.map(|value| parse_timestamp(field, value)).transpose()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}
