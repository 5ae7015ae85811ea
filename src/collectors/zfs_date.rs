use crate::error::TimestampError;
use chrono::{DateTime, NaiveDateTime, Utc, Weekday};

/// `Jan 5 00:34:31 2026`: zpool's ctime rendering minus the weekday, after
/// whitespace has been collapsed.
const ZFS_DATE_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Parse the ctime-style date zpool prints in its scan line.
///
/// Single-digit days are padded with an extra space by zpool, so runs of
/// whitespace are collapsed before parsing. The weekday must be a real
/// weekday name but is not cross-checked against the date. The wall-clock time is taken as UTC; zpool does not
/// print a zone.
pub fn parse_zfs_date(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    let fields: Vec<&str> = s.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(TimestampError::FieldCount { input: s.to_string(), found: fields.len() });
    }
    if fields[0].parse::<Weekday>().is_err() {
        return Err(TimestampError::Weekday { input: s.to_string(), found: fields[0].to_string() });
    }
    let normalized = fields[1..].join(" ");
    NaiveDateTime::parse_from_str(&normalized, ZFS_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| TimestampError::Format { input: s.to_string(), source })
}
