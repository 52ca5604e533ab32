//! Rendering of chrono values back into DICOM textual form,
//! used for display and for range encoding.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike};

/// Render a date in the DICOM textual form `YYYYMMDD`.
pub fn date_to_text(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Render a time in the DICOM textual form `HHMMSS`,
/// with a fraction appended when the value has sub-second precision.
pub fn time_to_text(time: NaiveTime) -> String {
    let micro = time.nanosecond() / 1_000;
    if micro == 0 {
        format!("{:02}{:02}{:02}", time.hour(), time.minute(), time.second())
    } else {
        format!(
            "{:02}{:02}{:02}.{:06}",
            time.hour(),
            time.minute(),
            time.second(),
            micro
        )
    }
}

/// Render a date-time in the DICOM textual form
/// `YYYYMMDDHHMMSS[.FFFFFF]&ZZXX`.
/// The UTC offset suffix is omitted when the offset is zero.
pub fn datetime_to_text(datetime: DateTime<FixedOffset>) -> String {
    let date = date_to_text(datetime.date_naive());
    let time = time_to_text(datetime.time());
    let offset = datetime.offset().fix().local_minus_utc();
    if offset == 0 {
        format!("{}{}", date, time)
    } else {
        let (sign, offset) = if offset < 0 {
            ('-', -offset)
        } else {
            ('+', offset)
        };
        format!(
            "{}{}{}{:02}{:02}",
            date,
            time,
            sign,
            offset / 3600,
            (offset % 3600) / 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_dates_and_times() {
        assert_eq!(
            date_to_text(NaiveDate::from_ymd_opt(2014, 10, 12).unwrap()),
            "20141012"
        );
        assert_eq!(
            time_to_text(NaiveTime::from_hms_opt(9, 30, 5).unwrap()),
            "093005"
        );
        assert_eq!(
            time_to_text(NaiveTime::from_hms_micro_opt(9, 30, 5, 250_000).unwrap()),
            "093005.250000"
        );
    }

    #[test]
    fn renders_datetime_with_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2014, 10, 12, 9, 30, 5).unwrap();
        assert_eq!(datetime_to_text(dt), "20141012093005-0500");

        let utc = FixedOffset::east_opt(0).unwrap();
        let dt = utc.with_ymd_and_hms(2014, 10, 12, 9, 30, 5).unwrap();
        assert_eq!(datetime_to_text(dt), "20141012093005");
    }
}
