/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Smallest value that rounds to "1.0M" at one decimal place
const MILLION_CUTOFF: f64 = 999_950.0;

/// Format an audience size compactly: 950, 12.5K, 1.2M
pub fn format_count(n: i64) -> String {
    let abs = n.unsigned_abs() as f64;
    let sign = if n < 0 { "-" } else { "" };
    if abs >= MILLION_CUTOFF {
        format!("{}{}M", sign, trim_decimal(abs / 1_000_000.0))
    } else if abs >= 1_000.0 {
        format!("{}{}K", sign, trim_decimal(abs / 1_000.0))
    } else {
        n.to_string()
    }
}

/// One decimal place, without a trailing ".0"
fn trim_decimal(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    formatted
        .strip_suffix(".0")
        .map(str::to_string)
        .unwrap_or(formatted)
}

/// Format an optional money amount as dollars
pub fn format_money(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format!("${:.2}", value),
        None => "-".to_string(),
    }
}

/// Format a rate already expressed in percent (e.g. 4.2 -> "4.2%")
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}
