use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Calendar month bucket (year + month) used by the monthly series.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> YearMonth {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summed blended cost across a grantee's full dataset. The sign is
/// preserved: credits and refunds can push a period below zero.
#[derive(Debug, Clone, Serialize)]
pub struct TotalCost {
    pub amount: f64,
}

impl TotalCost {
    pub fn is_negative(&self) -> bool {
        self.amount < 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCost {
    pub month: YearMonth,
    pub amount: f64,
}

/// Remaining-vs-spent proportion against the configured grant ceiling.
///
/// `spent` is floored at zero so the proportion stays renderable; the raw
/// signed total lives in [`TotalCost`]. `remaining` never exceeds the
/// grant and never goes below zero.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetView {
    pub grant_amount: f64,
    pub spent: f64,
    pub remaining: f64,
    pub over_budget: bool,
}

/// Everything the presenter needs for one grantee, recomputed each run.
#[derive(Debug, Clone, Serialize)]
pub struct GranteeReport {
    pub grantee: String,
    pub row_count: usize,
    pub total: TotalCost,
    pub budget: BudgetView,
    pub daily: Vec<DailyCost>,
    pub monthly: Vec<MonthlyCost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_display_pads() {
        let ym = YearMonth { year: 2021, month: 3 };
        assert_eq!(ym.to_string(), "2021-03");
    }

    #[test]
    fn year_month_orders_chronologically() {
        let dec = YearMonth { year: 2020, month: 12 };
        let jan = YearMonth { year: 2021, month: 1 };
        assert!(dec < jan);
    }

    #[test]
    fn year_month_serializes_as_string() {
        let ym = YearMonth { year: 2021, month: 1 };
        assert_eq!(serde_json::to_string(&ym).unwrap(), r#""2021-01""#);
    }

    #[test]
    fn total_cost_sign_flag() {
        assert!(!TotalCost { amount: 0.0 }.is_negative());
        assert!(!TotalCost { amount: 12.5 }.is_negative());
        assert!(TotalCost { amount: -0.01 }.is_negative());
    }
}
