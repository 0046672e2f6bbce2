//! Delivery-log validation: raw sheet rows → canonical [`DeliveryLog`]s.
//!
//! Row-level failures never abort a run; each rejected row carries its sheet
//! row number and reason so the caller can log and count it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::raid::DeliveryLog;
use crate::source::RawLogRow;

/// 라이더 ID 형식: `BC` + 숫자 6자리.
static RIDER_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^BC\d{6}$").unwrap());

/// Why one row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("invalid rider id {0:?}")]
    InvalidRiderId(String),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid delivery count {0:?}")]
    InvalidCount(String),
}

/// Outcome of validating one raw sheet row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Valid(DeliveryLog),
    /// Neither rider id nor date present: skipped without a word.
    Blank,
    Rejected {
        row_number: usize,
        rejection: RowRejection,
    },
}

/// Validate one raw row. Rules apply in order: blank check, rider id, date,
/// count. Boolean cells have no error path (unrecognized values mean false).
pub fn validate_row(row: &RawLogRow<'_>) -> RowOutcome {
    if row.rider_id.is_none() && row.date.is_none() {
        return RowOutcome::Blank;
    }

    let rider_id = row.rider_id.unwrap_or("");
    if !RIDER_ID_RE.is_match(rider_id) {
        return RowOutcome::Rejected {
            row_number: row.row_number,
            rejection: RowRejection::InvalidRiderId(rider_id.to_string()),
        };
    }

    let raw_date = row.date.unwrap_or("");
    let Some(delivery_date) = parse_delivery_date(raw_date) else {
        return RowOutcome::Rejected {
            row_number: row.row_number,
            rejection: RowRejection::InvalidDate(raw_date.to_string()),
        };
    };

    let raw_count = row.delivery_count.unwrap_or("");
    let Some(delivery_count) = parse_delivery_count(raw_count) else {
        return RowOutcome::Rejected {
            row_number: row.row_number,
            rejection: RowRejection::InvalidCount(raw_count.to_string()),
        };
    };

    RowOutcome::Valid(DeliveryLog {
        rider_id: rider_id.to_string(),
        delivery_date,
        delivery_count,
        is_rainy: parse_boolean(row.is_rainy),
        has_surge: parse_boolean(row.has_surge),
        district: row.district.unwrap_or("").to_string(),
    })
}

/// Lazily validate a whole export. Callers drive the iterator and decide how
/// to log/count each [`RowOutcome`].
pub fn validate_rows<'a, I>(rows: I) -> impl Iterator<Item = RowOutcome> + 'a
where
    I: Iterator<Item = RawLogRow<'a>> + 'a,
{
    rows.map(|row| validate_row(&row))
}

/// ISO `YYYY-MM-DD` is accepted literally. Other parseable representations
/// (`YYYY/MM/DD`, `YYYY.MM.DD`, datetime strings) are truncated to their
/// date component; no timezone shift is applied beyond what the parser does.
pub fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    None
}

/// Non-negative integer, or nothing.
pub fn parse_delivery_count(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().filter(|count| *count >= 0)
}

/// 우천여부/할증여부 셀 파싱: `true`/`yes`/`1`/`o` (대소문자 무관) ⇒ true,
/// 그 외 전부 false.
pub fn parse_boolean(raw: Option<&str>) -> bool {
    match raw {
        Some(value) => {
            matches!(
                value.to_ascii_lowercase().as_str(),
                "true" | "yes" | "1" | "o"
            )
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row<'a>(
        rider_id: Option<&'a str>,
        date: Option<&'a str>,
        count: Option<&'a str>,
    ) -> RawLogRow<'a> {
        RawLogRow {
            row_number: 7,
            rider_id,
            date,
            delivery_count: count,
            is_rainy: None,
            has_surge: None,
            district: None,
        }
    }

    #[test]
    fn accepts_well_formed_row() {
        let mut row = raw_row(Some("BC000001"), Some("2025-06-02"), Some("5"));
        row.is_rainy = Some("TRUE");
        row.district = Some("강남구");

        match validate_row(&row) {
            RowOutcome::Valid(log) => {
                assert_eq!(log.rider_id, "BC000001");
                assert_eq!(log.delivery_date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
                assert_eq!(log.delivery_count, 5);
                assert!(log.is_rainy);
                assert!(!log.has_surge);
                assert_eq!(log.district, "강남구");
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_rider_id() {
        let row = raw_row(Some("ABC123"), Some("2025-06-02"), Some("5"));
        match validate_row(&row) {
            RowOutcome::Rejected { row_number, rejection } => {
                assert_eq!(row_number, 7);
                assert_eq!(rejection, RowRejection::InvalidRiderId("ABC123".into()));
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        // Prefix-only and over-length ids fail too.
        for bad in ["BC12345", "BC1234567", "bc123456", "BC12345a"] {
            let row = raw_row(Some(bad), Some("2025-06-02"), Some("5"));
            assert!(matches!(
                validate_row(&row),
                RowOutcome::Rejected { rejection: RowRejection::InvalidRiderId(_), .. }
            ));
        }
    }

    #[test]
    fn blank_row_is_silently_skipped() {
        let row = raw_row(None, None, Some("3"));
        assert_eq!(validate_row(&row), RowOutcome::Blank);
    }

    #[test]
    fn rider_id_present_but_date_missing_is_rejected_not_blank() {
        let row = raw_row(Some("BC000001"), None, Some("3"));
        assert!(matches!(
            validate_row(&row),
            RowOutcome::Rejected { rejection: RowRejection::InvalidDate(_), .. }
        ));
    }

    #[test]
    fn date_representations_truncate_to_calendar_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        for raw in [
            "2025-06-02",
            "2025/06/02",
            "2025.06.02",
            "2025-06-02 13:45:00",
            "2025-06-02T13:45:00+09:00",
        ] {
            assert_eq!(parse_delivery_date(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_delivery_date("내일"), None);
        assert_eq!(parse_delivery_date("06/02"), None);
    }

    #[test]
    fn count_must_be_a_non_negative_integer() {
        assert_eq!(parse_delivery_count("0"), Some(0));
        assert_eq!(parse_delivery_count("12"), Some(12));
        assert_eq!(parse_delivery_count("-1"), None);
        assert_eq!(parse_delivery_count("3.5"), None);
        assert_eq!(parse_delivery_count("다섯"), None);
    }

    #[test]
    fn boolean_cells_accept_the_sheet_conventions() {
        for truthy in ["true", "TRUE", "yes", "Yes", "1", "o", "O"] {
            assert!(parse_boolean(Some(truthy)), "{truthy}");
        }
        for falsy in ["false", "no", "0", "x", "아니오", ""] {
            assert!(!parse_boolean(Some(falsy)), "{falsy}");
        }
        assert!(!parse_boolean(None));
    }
}
