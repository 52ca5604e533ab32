//! Parsing of DICOM textual forms of dates, times and date-times
//! into chrono values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

/// An error occurred during parsing of a date, time or date-time text value.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A component does not have the expected number of characters
    #[snafu(display("unexpected length {} of `{}` component", len, component))]
    UnexpectedLength {
        /// the name of the offending component
        component: &'static str,
        /// the number of characters found
        len: usize,
    },
    /// A component could not be parsed as a number
    #[snafu(display("invalid `{}` component", component))]
    InvalidComponent {
        /// the name of the offending component
        component: &'static str,
        /// the underlying integer parser error
        source: std::num::ParseIntError,
    },
    /// A component holds a number outside its calendar or clock range
    #[snafu(display("component `{}` is out of range", component))]
    ComponentOutOfRange {
        /// the name of the offending component
        component: &'static str,
    },
    /// The date-time does not exist in the given time zone offset
    InvalidDateTime,
}

type Result<T, E = Error> = std::result::Result<T, E>;

fn component(text: &str, range: std::ops::Range<usize>, name: &'static str) -> Result<u32> {
    let part = text
        .get(range)
        .with_context(|| UnexpectedLengthSnafu {
            component: name,
            len: text.len(),
        })?;
    part.parse().context(InvalidComponentSnafu { component: name })
}

/// Parse a complete date in the DICOM textual form `YYYYMMDD`.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    ensure!(
        text.len() == 8,
        UnexpectedLengthSnafu {
            component: "date",
            len: text.len(),
        }
    );
    let year = component(text, 0..4, "year")?;
    let month = component(text, 4..6, "month")?;
    let day = component(text, 6..8, "day")?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .context(ComponentOutOfRangeSnafu { component: "date" })
}

/// Parse a time in the DICOM textual form `HHMMSS`
/// with an optional fraction of up to 6 digits (`HHMMSS.FFFFFF`).
/// Minute and second components may be omitted.
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let text = text.trim();
    let (body, fraction) = match text.find('.') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    };
    ensure!(
        matches!(body.len(), 2 | 4 | 6),
        UnexpectedLengthSnafu {
            component: "time",
            len: body.len(),
        }
    );
    let hour = component(body, 0..2, "hour")?;
    let minute = if body.len() >= 4 {
        component(body, 2..4, "minute")?
    } else {
        0
    };
    let second = if body.len() >= 6 {
        component(body, 4..6, "second")?
    } else {
        0
    };
    let micro = if fraction.is_empty() {
        0
    } else {
        ensure!(
            fraction.len() <= 6,
            UnexpectedLengthSnafu {
                component: "fraction",
                len: fraction.len(),
            }
        );
        let frac: u32 = fraction
            .parse()
            .context(InvalidComponentSnafu {
                component: "fraction",
            })?;
        frac * 10u32.pow(6 - fraction.len() as u32)
    };
    NaiveTime::from_hms_micro_opt(hour, minute, second, micro)
        .context(ComponentOutOfRangeSnafu { component: "time" })
}

/// Parse a date-time in the DICOM textual form
/// `YYYYMMDD[HHMMSS[.FFFFFF]][&ZZXX]`,
/// where `&` is `+` or `-` and `ZZXX` is the UTC offset in hours and minutes.
/// When no offset suffix is present, UTC is assumed.
pub fn parse_datetime(text: &str) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();
    // an offset suffix can only start at or after
    // the end of the date component
    let offset_pos = text[8.min(text.len())..]
        .find(|c| c == '+' || c == '-')
        .map(|i| i + 8);
    let (body, offset) = match offset_pos {
        Some(i) => (&text[..i], parse_offset(&text[i..])?),
        None => (text, Utc.fix()),
    };
    let date = parse_date(&body[..8.min(body.len())])?;
    let time = if body.len() > 8 {
        parse_time(&body[8..])?
    } else {
        NaiveTime::MIN
    };
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .context(InvalidDateTimeSnafu)
}

fn parse_offset(text: &str) -> Result<FixedOffset> {
    ensure!(
        text.len() == 5,
        UnexpectedLengthSnafu {
            component: "offset",
            len: text.len(),
        }
    );
    let hours = component(text, 1..3, "offset hours")?;
    let minutes = component(text, 3..5, "offset minutes")?;
    let seconds = (hours * 3600 + minutes * 60) as i32;
    let seconds = if text.starts_with('-') {
        -seconds
    } else {
        seconds
    };
    FixedOffset::east_opt(seconds).context(ComponentOutOfRangeSnafu { component: "offset" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_date() {
        assert_eq!(
            parse_date("20141012").unwrap(),
            NaiveDate::from_ymd_opt(2014, 10, 12).unwrap()
        );
        assert!(parse_date("201410").is_err());
        assert!(parse_date("2014101x").is_err());
        assert!(parse_date("20141301").is_err());
    }

    #[test]
    fn parses_time_with_partial_precision() {
        assert_eq!(
            parse_time("10").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("1030").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("103015.25").unwrap(),
            NaiveTime::from_hms_micro_opt(10, 30, 15, 250_000).unwrap()
        );
        assert!(parse_time("103").is_err());
        assert!(parse_time("103015.1234567").is_err());
    }

    #[test]
    fn parses_datetime_with_offset() {
        let dt = parse_datetime("20141012103015-0500").unwrap();
        assert_eq!(dt.offset(), &FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(
            dt.naive_local(),
            NaiveDate::from_ymd_opt(2014, 10, 12)
                .unwrap()
                .and_hms_opt(10, 30, 15)
                .unwrap()
        );

        let dt = parse_datetime("20141012").unwrap();
        assert_eq!(dt.offset(), &FixedOffset::east_opt(0).unwrap());
    }
}
