//! Portal date formats and search date ranges.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// Date format the portal expects in search payloads and shows in listings.
pub const PORTAL_DATE_FORMAT: &str = "%d.%m.%Y";

const PORTAL_DATETIME_FORMATS: &[&str] = &["%d.%m.%Y %H:%M", "%d.%m.%Y %H:%M:%S"];

/// Parse a listing timestamp such as `17.10.2024 14:35`.
///
/// A bare date is accepted and maps to midnight.
pub fn parse_portal_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    PORTAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, PORTAL_DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Inclusive publication date window of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub finish: NaiveDate,
}

impl DateRange {
    /// `[today - days, today]`, with the start clamped to the earliest
    /// representable date.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start,
            finish: today,
        }
    }

    /// Window ending today in local time.
    pub fn ending_today(days: u32) -> Self {
        Self::last_days(Local::now().date_naive(), days)
    }

    pub fn start_param(&self) -> String {
        self.start.format(PORTAL_DATE_FORMAT).to_string()
    }

    pub fn finish_param(&self) -> String {
        self.finish.format(PORTAL_DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_variants() {
        let ts = parse_portal_timestamp(" 17.10.2024 14:35 ").unwrap();
        assert_eq!(ts.to_string(), "2024-10-17 14:35:00");

        let ts = parse_portal_timestamp("01.02.2024 09:05:59").unwrap();
        assert_eq!(ts.to_string(), "2024-02-01 09:05:59");

        let ts = parse_portal_timestamp("01.02.2024").unwrap();
        assert_eq!(ts.to_string(), "2024-02-01 00:00:00");

        assert!(parse_portal_timestamp("yesterday").is_none());
        assert!(parse_portal_timestamp("32.01.2024 10:00").is_none());
    }

    #[test]
    fn test_last_days_range() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let range = DateRange::last_days(today, 30);
        assert_eq!(range.start_param(), "01.02.2024");
        assert_eq!(range.finish_param(), "02.03.2024");

        let range = DateRange::last_days(today, 0);
        assert_eq!(range.start, range.finish);
    }

    #[test]
    fn test_last_days_clamps_huge_window() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let range = DateRange::last_days(today, 100_000_000);
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.finish, today);

        let range = DateRange::last_days(today, u32::MAX);
        assert_eq!(range.start, NaiveDate::MIN);
    }
}
