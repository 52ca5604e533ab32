//! Handling of date, time and date-time ranges.
//!
//! A range is a half-open interval with an optional lower and upper bound.
//! When supplied as the value of a date or time attribute,
//! a range is rendered into the DICOM range-matching text form
//! (`start-`, `-end`, or `start-end`).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use std::fmt;

use super::serialize::{date_to_text, datetime_to_text, time_to_text};

/// Represents a date range as two `Option<chrono::NaiveDate>` values.
/// `None` means no upper or no lower bound for the range is present.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use dcmset_core::value::DateRange;
///
/// let dr = DateRange::from_start(NaiveDate::from_ymd_opt(2000, 5, 3).unwrap());
///
/// assert!(dr.start().is_some());
/// assert!(dr.end().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// Represents a time range as two `Option<chrono::NaiveTime>` values.
/// `None` means no upper or no lower bound for the range is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
}

/// Represents a date-time range as two
/// `Option<chrono::DateTime<FixedOffset>>` values.
/// `None` means no upper or no lower bound for the range is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTimeRange {
    start: Option<DateTime<FixedOffset>>,
    end: Option<DateTime<FixedOffset>>,
}

macro_rules! impl_range {
    ($name:ident, $value:ty, $render:path) => {
        impl $name {
            /// Construct a range with both a lower and an upper bound.
            pub fn new(start: $value, end: $value) -> Self {
                $name {
                    start: Some(start),
                    end: Some(end),
                }
            }

            /// Construct a range with a lower bound only.
            pub fn from_start(start: $value) -> Self {
                $name {
                    start: Some(start),
                    end: None,
                }
            }

            /// Construct a range with an upper bound only.
            pub fn from_end(end: $value) -> Self {
                $name {
                    start: None,
                    end: Some(end),
                }
            }

            /// The lower bound of the range, if present.
            pub fn start(&self) -> Option<&$value> {
                self.start.as_ref()
            }

            /// The upper bound of the range, if present.
            pub fn end(&self) -> Option<&$value> {
                self.end.as_ref()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if let Some(start) = self.start {
                    f.write_str(&$render(start))?;
                }
                f.write_str("-")?;
                if let Some(end) = self.end {
                    f.write_str(&$render(end))?;
                }
                Ok(())
            }
        }
    };
}

impl_range!(DateRange, NaiveDate, date_to_text);
impl_range!(TimeRange, NaiveTime, time_to_text);
impl_range!(DateTimeRange, DateTime<FixedOffset>, datetime_to_text);
