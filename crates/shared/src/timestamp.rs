//! Capture timestamp parsing and the ordering used by the gallery sort.

use std::{borrow::Cow, cmp::Ordering};

use chrono::{DateTime, FixedOffset};

use crate::domain::SortOrder;

/// `yyyy-MM-ddTHH:mm:ss.SSS±HH:mm`, exactly three fractional digits.
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3f%:z";

pub fn parse_capture_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = match raw.strip_suffix('Z') {
        Some(utc) => Cow::Owned(format!("{utc}+00:00")),
        None => Cow::Borrowed(raw),
    };
    if !starts_with_digit(&raw) || !has_colon_offset(&raw) {
        return None;
    }
    DateTime::parse_from_str(&raw, CAPTURE_TIMESTAMP_FORMAT).ok()
}

fn starts_with_digit(raw: &str) -> bool {
    raw.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// chrono's `%:z` also takes `+HHMM` and `+HH MM`; only `±HH:mm` is valid here.
fn has_colon_offset(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let Some(offset) = bytes.len().checked_sub(6).map(|start| &bytes[start..]) else {
        return false;
    };
    matches!(offset[0], b'+' | b'-')
        && offset[1].is_ascii_digit()
        && offset[2].is_ascii_digit()
        && offset[3] == b':'
        && offset[4].is_ascii_digit()
        && offset[5].is_ascii_digit()
}

/// Total order over possibly-unparseable timestamps.
///
/// Parseable values compare chronologically (reversed for descending).
/// Unparseable values sort after every parseable one regardless of direction,
/// and compare equal among themselves.
pub fn compare_capture_times(
    a: Option<&DateTime<FixedOffset>>,
    b: Option<&DateTime<FixedOffset>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::TimeAscending => a.cmp(b),
            SortOrder::TimeDescending => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_millisecond_timestamp_with_offset() {
        let parsed = parse_capture_timestamp("2024-03-06T14:05:09.123-05:00").expect("parse");
        assert_eq!(parsed.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(parsed.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn accepts_zulu_designator() {
        let zulu = parse_capture_timestamp("2024-01-01T10:00:00.000Z").expect("zulu");
        let explicit = parse_capture_timestamp("2024-01-01T10:00:00.000+00:00").expect("offset");
        assert_eq!(zulu, explicit);
    }

    #[test]
    fn rejects_timestamps_outside_the_fixed_format() {
        for raw in [
            "",
            "yesterday",
            "2024-01-01T10:00:00+00:00",
            "2024-01-01T10:00:00.00+00:00",
            "2024-01-01T10:00:00.0000+00:00",
            "2024-01-01 10:00:00.000+00:00",
            "2024-01-01T10:00:00.000",
            "2024-01-01T10:00:00.000+0000",
            "2024-01-01T10:00:00.000+00 00",
            "2024-01-01T10:00:00.000+05",
            " 2024-01-01T10:00:00.000+00:00",
            "2024-01-01T10:00:00.000+00:00 ",
            "2024-01-01T10:00:00.000Z ",
            " 2024-01-01T10:00:00.000Z",
        ] {
            assert!(parse_capture_timestamp(raw).is_none(), "accepted {raw:?}");
        }
    }

    #[test]
    fn offsets_are_compared_as_instants() {
        let earlier = parse_capture_timestamp("2024-01-01T10:00:00.000+02:00");
        let later = parse_capture_timestamp("2024-01-01T09:30:00.000+00:00");
        assert_eq!(
            compare_capture_times(earlier.as_ref(), later.as_ref(), SortOrder::TimeAscending),
            Ordering::Less
        );
    }

    #[test]
    fn unparseable_sorts_last_in_both_directions() {
        let valid = parse_capture_timestamp("2024-01-01T10:00:00.000+00:00");
        for order in [SortOrder::TimeAscending, SortOrder::TimeDescending] {
            assert_eq!(
                compare_capture_times(valid.as_ref(), None, order),
                Ordering::Less
            );
            assert_eq!(
                compare_capture_times(None, valid.as_ref(), order),
                Ordering::Greater
            );
            assert_eq!(compare_capture_times(None, None, order), Ordering::Equal);
        }
    }
}
