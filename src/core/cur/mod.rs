pub mod fetcher;
pub mod locator;
pub mod manifest;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

/// A report period: the `YYYYMMDD-YYYYMMDD` date-range segment under which
/// AWS organizes a month of CUR output.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Period, PeriodError> {
        let Some((start, end)) = s.split_once('-') else {
            return Err(PeriodError);
        };
        if start.len() != 8 || end.len() != 8 {
            return Err(PeriodError);
        }
        let start = NaiveDate::parse_from_str(start, "%Y%m%d").map_err(|_| PeriodError)?;
        let end = NaiveDate::parse_from_str(end, "%Y%m%d").map_err(|_| PeriodError)?;
        if end < start {
            return Err(PeriodError);
        }
        Ok(Period { start, end })
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid report period format; expected YYYYMMDD-YYYYMMDD")]
pub struct PeriodError;

/// Structured parse of a CUR object key.
///
/// The remote layout is a fixed template:
/// `<prefix>/<report_name>/<period>/[<assembly_id>/]<file_name>`
/// where the assembly id segment is present for regular reports and absent
/// for overwrite-style reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportKey {
    pub period: Period,
    pub assembly_id: Option<String>,
    pub file_name: String,
}

impl ReportKey {
    /// Parse `key` against the template for the given prefix and report
    /// name. Returns `None` for keys outside the template (unrelated
    /// objects under the same prefix are common).
    pub fn parse(key: &str, prefix: &str, report_name: &str) -> Option<ReportKey> {
        let rest = key.strip_prefix(prefix)?;
        let rest = if prefix.is_empty() || prefix.ends_with('/') {
            rest
        } else {
            rest.strip_prefix('/')?
        };
        let rest = rest.strip_prefix(report_name)?.strip_prefix('/')?;

        let mut segments = rest.split('/');
        let period: Period = segments.next()?.parse().ok()?;
        let mut tail: Vec<&str> = segments.collect();

        let file_name = tail.pop().filter(|s| !s.is_empty())?.to_string();
        let assembly_id = match tail.as_slice() {
            [] => None,
            [id] if !id.is_empty() => Some((*id).to_string()),
            _ => return None,
        };

        Some(ReportKey {
            period,
            assembly_id,
            file_name,
        })
    }

    pub fn is_manifest(&self) -> bool {
        self.file_name.ends_with(".json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_parses_date_range() {
        let period: Period = "20210201-20210301".parse().unwrap();
        assert_eq!(period.start, date(2021, 2, 1));
        assert_eq!(period.end, date(2021, 3, 1));
    }

    #[test]
    fn period_display_round_trips() {
        let period: Period = "20210201-20210301".parse().unwrap();
        assert_eq!(period.to_string(), "20210201-20210301");
    }

    #[test]
    fn period_rejects_malformed_segments() {
        for s in [
            "20210201",
            "2021021-20210301",
            "20210201-2021030",
            "20211301-20211401",
            "20210301-20210201",
            "abcdefgh-ijklmnop",
            "",
        ] {
            assert!(s.parse::<Period>().is_err(), "should reject {s:?}");
        }
    }

    #[test]
    fn period_orders_by_start_date() {
        let jan: Period = "20210101-20210201".parse().unwrap();
        let feb: Period = "20210201-20210301".parse().unwrap();
        assert!(jan < feb);
    }

    #[test]
    fn report_key_parses_with_assembly_id() {
        let key = ReportKey::parse(
            "reports/cur/MyReport/20210201-20210301/1efe213b-eed6/MyReport-1.csv.gz",
            "reports/cur",
            "MyReport",
        )
        .unwrap();
        assert_eq!(key.period.to_string(), "20210201-20210301");
        assert_eq!(key.assembly_id.as_deref(), Some("1efe213b-eed6"));
        assert_eq!(key.file_name, "MyReport-1.csv.gz");
        assert!(!key.is_manifest());
    }

    #[test]
    fn report_key_parses_without_assembly_id() {
        let key = ReportKey::parse(
            "reports/cur/MyReport/20210201-20210301/MyReport-Manifest.json",
            "reports/cur",
            "MyReport",
        )
        .unwrap();
        assert_eq!(key.assembly_id, None);
        assert!(key.is_manifest());
    }

    #[test]
    fn report_key_rejects_foreign_keys() {
        assert!(ReportKey::parse("somewhere/else.json", "reports/cur", "MyReport").is_none());
        assert!(ReportKey::parse(
            "reports/cur/OtherReport/20210201-20210301/x.json",
            "reports/cur",
            "MyReport"
        )
        .is_none());
        assert!(ReportKey::parse(
            "reports/cur/MyReport/not-a-period/x.json",
            "reports/cur",
            "MyReport"
        )
        .is_none());
        assert!(ReportKey::parse(
            "reports/cur/MyReport/20210201-20210301/a/b/x.json",
            "reports/cur",
            "MyReport"
        )
        .is_none());
    }

    #[test]
    fn report_key_handles_empty_prefix() {
        let key = ReportKey::parse(
            "MyReport/20210201-20210301/MyReport-Manifest.json",
            "",
            "MyReport",
        )
        .unwrap();
        assert!(key.is_manifest());
    }
}
