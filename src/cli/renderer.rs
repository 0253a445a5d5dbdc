use colored::{control, Color, Colorize};

use crate::core::config::GranteeConfig;
use crate::core::formatter::{
    chart_color, format_budget_bar, format_dollars, format_remaining_percent, format_scaled_bar,
};
use crate::core::models::cost::{DailyCost, GranteeReport};

const BUDGET_BAR_WIDTH: usize = 12;
const SERIES_BAR_WIDTH: usize = 20;
const COMPACT_DAILY_ROWS: usize = 10;

/// Render a grantee's report block as a colored (or plain) string.
///
/// Layout:
/// ```text
///  cf (CFAWSCostReportRegular)
///   Total     $1234.56 across 5210 rows
///   Budget    38% remaining [█████░░░░░░░]  ($2000.00 grant)
///   Monthly:
///     2021-01     $234.56  ████
///     2021-02     $999.99  ████████████████████
///   Daily (last 10):
///     Jan 05       $12.34  ███████
/// ```
pub fn render_grantee(
    report: &GranteeReport,
    config: &GranteeConfig,
    show_all: bool,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let color = chart_color(&config.chart_color).unwrap_or(Color::Cyan);
    let mut lines: Vec<String> = Vec::new();

    // Header: " cf (CFAWSCostReportRegular)"
    let header = format!(" {} ({})", report.grantee, config.report_name);
    lines.push(header.bold().to_string());

    // Total
    let total_str = format_dollars(report.total.amount);
    let total_colored = if report.total.is_negative() {
        total_str.red().to_string()
    } else {
        total_str.color(color).to_string()
    };
    lines.push(format!(
        "  {}     {} across {} rows",
        "Total".cyan(),
        total_colored,
        report.row_count
    ));
    if report.total.is_negative() {
        lines.push(format!(
            "            {}",
            "negative total: credits or refunds exceed usage".yellow()
        ));
    }

    // Budget
    let percent = format_remaining_percent(report.budget.spent, report.budget.grant_amount);
    let bar = format_budget_bar(
        report.budget.spent,
        report.budget.grant_amount,
        BUDGET_BAR_WIDTH,
    );
    lines.push(format!(
        "  {}    {} {}  ({} grant)",
        "Budget".cyan(),
        percent,
        bar.color(color),
        format_dollars(report.budget.grant_amount)
    ));
    if report.budget.over_budget {
        lines.push(format!(
            "            {}",
            "OVER BUDGET: spend exceeds the grant ceiling".red().bold()
        ));
    }

    // Monthly series
    if !report.monthly.is_empty() {
        lines.push(format!("  {}:", "Monthly".cyan()));
        let max = report.monthly.iter().map(|m| m.amount).fold(0.0, f64::max);
        for month in &report.monthly {
            let bar = format_scaled_bar(month.amount, max, SERIES_BAR_WIDTH);
            lines.push(format!(
                "    {:<9} {:>11}  {}",
                month.month.to_string(),
                format_dollars(month.amount),
                bar.color(color)
            ));
        }
    }

    // Daily series: compact output shows only the trailing days.
    if !report.daily.is_empty() {
        let rows: &[DailyCost] = if show_all {
            &report.daily
        } else {
            let start = report.daily.len().saturating_sub(COMPACT_DAILY_ROWS);
            &report.daily[start..]
        };
        let label = if rows.len() == report.daily.len() {
            "Daily".to_string()
        } else {
            format!("Daily (last {})", rows.len())
        };
        lines.push(format!("  {}:", label.cyan()));
        let max = rows.iter().map(|d| d.amount).fold(0.0, f64::max);
        for day in rows {
            let bar = format_scaled_bar(day.amount, max, SERIES_BAR_WIDTH);
            lines.push(format!(
                "    {:<9} {:>11}  {}",
                day.date.format("%b %d").to_string(),
                format_dollars(day.amount),
                bar.color(color)
            ));
        }
    }

    lines.join("\n")
}
