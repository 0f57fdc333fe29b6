//! Defines [`PostDate`], the free-form date from a post's front matter paired
//! with a parsed, comparable form used for ordering posts.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] =
    &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// A post date. The original string is what gets rendered; the parsed value
/// (UTC, if the source carried an offset) is what gets sorted. Dates that
/// can't be parsed are still rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDate {
    raw: String,
    parsed: Option<NaiveDateTime>,
}

impl PostDate {
    pub fn parse(raw: &str) -> PostDate {
        PostDate {
            raw: raw.to_owned(),
            parsed: parse_lenient(raw.trim()),
        }
    }

    /// The date exactly as it was written in the front matter.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The comparable form of the date. [`None`] orders before every parsed
    /// date, so unparseable dates end up last in a newest-first listing.
    pub fn parsed(&self) -> Option<NaiveDateTime> {
        self.parsed
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.raw.fmt(f)
    }
}

fn parse_lenient(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(s, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        })
}

#[cfg(test)]
mod test {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    #[test]
    fn test_parse_formats() {
        for raw in &[
            "2025-03-01",
            "2025/03/01",
            "March 1, 2025",
            "Mar 01, 2025",
            "1 March 2025",
            "2025-03-01T00:00:00",
            "2025-03-01 00:00",
            "2025-03-01T01:00:00+01:00",
            "Sat, 01 Mar 2025 00:00:00 +0000",
            "  2025-03-01 ",
        ] {
            assert_eq!(ymd(2025, 3, 1), PostDate::parse(raw).parsed(), "{}", raw);
        }
    }

    #[test]
    fn test_raw_is_preserved() {
        let date = PostDate::parse("March 1, 2025");
        assert_eq!("March 1, 2025", date.as_str());
        assert_eq!("March 1, 2025", date.to_string());
    }

    #[test]
    fn test_unparseable_ranks_oldest() {
        let unknown = PostDate::parse("someday");
        assert_eq!(None, unknown.parsed());
        assert!(unknown.parsed() < PostDate::parse("0001-01-01").parsed());
    }

    #[test]
    fn test_ordering() {
        let parsed = |raw: &str| PostDate::parse(raw).parsed();
        assert!(parsed("2025-01-01") < parsed("2025-02-01"));
        assert!(parsed("2025-01-01 10:00") > parsed("2025-01-01"));
    }
}
