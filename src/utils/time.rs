//! UTC timestamps for extraction and report metadata.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time as ISO 8601 (e.g. "2026-08-28T09:30:00Z").
pub fn utc_now_iso8601() -> String {
    iso8601_from_unix(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    )
}

/// Format a unix timestamp (seconds) as ISO 8601 UTC.
pub fn iso8601_from_unix(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

// Howard Hinnant's days-to-civil algorithm, valid for the unix era.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_timestamps() {
        assert_eq!(iso8601_from_unix(0), "1970-01-01T00:00:00Z");
        // 2024-02-29 12:00:00 UTC, a leap day
        assert_eq!(iso8601_from_unix(1_709_208_000), "2024-02-29T12:00:00Z");
        // 2000-03-01 00:00:00 UTC, the day after the century leap day
        assert_eq!(iso8601_from_unix(951_868_800), "2000-03-01T00:00:00Z");
    }

    #[test]
    fn test_now_shape() {
        let ts = utc_now_iso8601();
        assert_eq!(ts.len(), 20);
        assert!(ts.contains('T') && ts.ends_with('Z'));
    }
}
