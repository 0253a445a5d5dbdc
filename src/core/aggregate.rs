use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{error, warn};

use crate::core::dataset::{CostRecord, GranteeDataset};
use crate::core::models::cost::{BudgetView, DailyCost, MonthlyCost, TotalCost, YearMonth};

/// Sum of the blended-cost column across the full dataset.
///
/// A negative sum is a real signal (credits or refunds landed in the
/// window) and is reported, not rejected.
pub fn total_cost(grantee: &str, dataset: &GranteeDataset) -> TotalCost {
    let amount: f64 = dataset.records.iter().map(|r| r.blended_cost).sum();
    let total = TotalCost { amount };
    if total.is_negative() {
        warn!(grantee = %grantee, amount, "total blended cost is negative");
    }
    total
}

/// Cost per calendar day, keyed by the usage-end date with the
/// time-of-day suffix stripped. The grouping makes the result insensitive
/// to row order.
pub fn daily_costs(grantee: &str, dataset: &GranteeDataset) -> Vec<DailyCost> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in &dataset.records {
        match end_date(record) {
            Some(date) => *buckets.entry(date).or_insert(0.0) += record.blended_cost,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(grantee = %grantee, skipped, "rows with unparseable usage-end dates were ignored");
    }
    buckets
        .into_iter()
        .map(|(date, amount)| DailyCost { date, amount })
        .collect()
}

/// Cost per calendar month, keyed by the usage-start month.
///
/// The start timestamp is used rather than the end one: a usage window
/// can end at 00:xx on the first day of the next month, which would
/// misattribute its cost to that month.
pub fn monthly_costs(grantee: &str, dataset: &GranteeDataset) -> Vec<MonthlyCost> {
    let mut buckets: BTreeMap<YearMonth, f64> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in &dataset.records {
        match start_month(record) {
            Some(month) => *buckets.entry(month).or_insert(0.0) += record.blended_cost,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(grantee = %grantee, skipped, "rows with unparseable usage-start dates were ignored");
    }
    buckets
        .into_iter()
        .map(|(month, amount)| MonthlyCost { month, amount })
        .collect()
}

/// Remaining-vs-spent proportion against the grant ceiling. Spend past
/// the ceiling is flagged and logged, never thrown; a negative total is
/// floored at zero because a proportion cannot carry a negative slice.
pub fn budget_view(grantee: &str, grant_amount: f64, total: &TotalCost) -> BudgetView {
    let over_budget = total.amount > grant_amount;
    if over_budget {
        error!(
            grantee = %grantee,
            spent = total.amount,
            grant_amount,
            "grant ceiling exceeded"
        );
    }

    let spent = total.amount.max(0.0);
    let remaining = (grant_amount - spent).max(0.0);
    BudgetView {
        grant_amount,
        spent,
        remaining,
        over_budget,
    }
}

fn end_date(record: &CostRecord) -> Option<NaiveDate> {
    let date_part = record.usage_end.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn start_month(record: &CostRecord) -> Option<YearMonth> {
    let date_part = record.usage_start.split('T').next()?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some(YearMonth::from_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cost: f64, start: &str, end: &str) -> CostRecord {
        CostRecord {
            blended_cost: cost,
            usage_start: start.to_string(),
            usage_end: end.to_string(),
        }
    }

    fn dataset(records: Vec<CostRecord>) -> GranteeDataset {
        GranteeDataset { records }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn total_is_column_sum() {
        let ds = dataset(vec![
            record(10.0, "2021-01-05T00:00:00Z", "2021-01-05T01:00:00Z"),
            record(5.0, "2021-01-05T00:00:00Z", "2021-01-06T01:00:00Z"),
        ]);
        let total = total_cost("cf", &ds);
        assert_eq!(total.amount, 15.0);
        assert!(!total.is_negative());
    }

    #[test]
    fn negative_total_is_flagged_not_fatal() {
        let ds = dataset(vec![
            record(3.0, "2021-01-05T00:00:00Z", "2021-01-05T01:00:00Z"),
            record(-7.5, "2021-01-05T00:00:00Z", "2021-01-05T01:00:00Z"),
        ]);
        let total = total_cost("cf", &ds);
        assert_eq!(total.amount, -4.5);
        assert!(total.is_negative());
    }

    #[test]
    fn daily_groups_by_end_date() {
        let ds = dataset(vec![
            record(10.0, "2021-01-05T00:00:00Z", "2021-01-05T23:00:00Z"),
            record(5.0, "2021-01-05T00:00:00Z", "2021-01-06T01:00:00Z"),
            record(2.0, "2021-01-05T12:00:00Z", "2021-01-05T13:00:00Z"),
        ]);
        let daily = daily_costs("cf", &ds);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, date(2021, 1, 5));
        assert_eq!(daily[0].amount, 12.0);
        assert_eq!(daily[1].date, date(2021, 1, 6));
        assert_eq!(daily[1].amount, 5.0);
    }

    #[test]
    fn daily_is_insensitive_to_row_order() {
        let rows = vec![
            record(1.0, "2021-01-01T00:00:00Z", "2021-01-01T01:00:00Z"),
            record(2.0, "2021-01-02T00:00:00Z", "2021-01-02T01:00:00Z"),
            record(4.0, "2021-01-01T02:00:00Z", "2021-01-01T03:00:00Z"),
            record(8.0, "2021-01-03T00:00:00Z", "2021-01-03T01:00:00Z"),
        ];
        let forward = daily_costs("cf", &dataset(rows.clone()));
        let mut reversed_rows = rows;
        reversed_rows.reverse();
        let reversed = daily_costs("cf", &dataset(reversed_rows));

        assert_eq!(forward.len(), reversed.len());
        for (a, b) in forward.iter().zip(&reversed) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.amount, b.amount);
        }
    }

    #[test]
    fn monthly_buckets_by_usage_start() {
        // Ends just after midnight on Feb 1st; the cost belongs to January.
        let ds = dataset(vec![record(
            9.0,
            "2021-01-31T23:00:00",
            "2021-02-01T00:30:00Z",
        )]);
        let monthly = monthly_costs("cf", &ds);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].month.to_string(), "2021-01");
        assert_eq!(monthly[0].amount, 9.0);
    }

    #[test]
    fn monthly_series_is_month_ordered() {
        let ds = dataset(vec![
            record(1.0, "2021-02-10T00:00:00Z", "2021-02-10T01:00:00Z"),
            record(2.0, "2020-12-10T00:00:00Z", "2020-12-10T01:00:00Z"),
            record(4.0, "2021-01-10T00:00:00Z", "2021-01-10T01:00:00Z"),
        ]);
        let months: Vec<String> = monthly_costs("cf", &ds)
            .iter()
            .map(|m| m.month.to_string())
            .collect();
        assert_eq!(months, vec!["2020-12", "2021-01", "2021-02"]);
    }

    #[test]
    fn unparseable_timestamps_are_skipped() {
        let ds = dataset(vec![
            record(1.0, "garbage", "garbage"),
            record(2.0, "2021-01-05T00:00:00Z", "2021-01-05T01:00:00Z"),
        ]);
        assert_eq!(daily_costs("cf", &ds).len(), 1);
        assert_eq!(monthly_costs("cf", &ds).len(), 1);
    }

    #[test]
    fn budget_clamps_overspend_to_zero_remaining() {
        let view = budget_view("cf", 100.0, &TotalCost { amount: 150.0 });
        assert_eq!(view.remaining, 0.0);
        assert_eq!(view.spent, 150.0);
        assert!(view.over_budget);
    }

    #[test]
    fn budget_floors_negative_spend() {
        let view = budget_view("cf", 100.0, &TotalCost { amount: -25.0 });
        assert_eq!(view.spent, 0.0);
        assert_eq!(view.remaining, 100.0);
        assert!(!view.over_budget);
    }

    #[test]
    fn budget_within_ceiling() {
        let view = budget_view("cf", 100.0, &TotalCost { amount: 40.0 });
        assert_eq!(view.spent, 40.0);
        assert_eq!(view.remaining, 60.0);
        assert!(!view.over_budget);
    }
}
