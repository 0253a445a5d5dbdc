use colored::Color;

/// Dollar amount with two decimals, e.g. "$123.45" / "-$4.20".
pub fn format_dollars(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Returns "{remaining}% remaining" of the grant, rounded to nearest integer.
pub fn format_remaining_percent(spent: f64, grant_amount: f64) -> String {
    if grant_amount <= 0.0 {
        return "0% remaining".to_string();
    }
    let remaining = ((grant_amount - spent) / grant_amount * 100.0)
        .clamp(0.0, 100.0)
        .round() as u64;
    format!("{}% remaining", remaining)
}

/// Returns "[████████░░░░]" where █ = remaining grant, ░ = spent.
/// Width is the number of block characters inside the brackets.
pub fn format_budget_bar(spent: f64, grant_amount: f64, width: usize) -> String {
    let used = if grant_amount > 0.0 {
        (spent / grant_amount).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let used_blocks = (used * width as f64).round() as usize;
    let remaining_blocks = width.saturating_sub(used_blocks);

    let filled: String = "█".repeat(remaining_blocks);
    let empty: String = "░".repeat(used_blocks);

    format!("[{}{}]", filled, empty)
}

/// Bar scaled against the series maximum, for daily/monthly chart rows.
/// Any positive amount gets at least one block.
pub fn format_scaled_bar(amount: f64, max_amount: f64, width: usize) -> String {
    if max_amount <= 0.0 || amount <= 0.0 {
        return String::new();
    }
    let blocks = ((amount / max_amount) * width as f64).round().max(1.0) as usize;
    "█".repeat(blocks.min(width))
}

/// Map a configured chart color token to a terminal color.
pub fn chart_color(name: &str) -> Option<Color> {
    match name.to_ascii_lowercase().as_str() {
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        _ => None,
    }
}
