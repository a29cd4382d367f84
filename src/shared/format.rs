use chrono::{DateTime, Local, Utc};

use crate::shared::constants::TIMESTAMP_FORMAT;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Formats a byte count with the largest fitting unit and up to two decimals.
///
/// `0` renders as `"0 Bytes"`, `1024` as `"1 KB"`, `1500` as `"1.46 KB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut rounded = (value * 100.0).round() / 100.0;
    if rounded >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        rounded = ((rounded / 1024.0) * 100.0).round() / 100.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(rounded), SIZE_UNITS[unit])
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Renders an instant as `YYYY-MM-DD HH:MM:SS` in the service's local time zone
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    #[test]
    fn test_format_size_examples() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(10), "10 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1500), "1.46 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn test_format_size_rounding_moves_to_next_unit() {
        assert_eq!(format_size(1024 * 1024 - 1), "1 MB");
    }

    #[test]
    fn test_format_size_caps_at_terabytes() {
        let two_pb = 2 * 1024_u64.pow(5);
        assert_eq!(format_size(two_pb), "2048 TB");
    }

    #[test]
    fn test_format_timestamp_uses_local_time() {
        let local = NaiveDateTime::parse_from_str("2026-03-14 09:26:53", TIMESTAMP_FORMAT).unwrap();
        let instant = Local
            .from_local_datetime(&local)
            .single()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(format_timestamp(instant), "2026-03-14 09:26:53");
    }
}
