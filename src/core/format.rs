const GROUP_SEPARATOR: char = '\u{202f}';
const CURRENCY_SUFFIX: &str = "\u{a0}€";

/// Whole-euro amount in French grouping, e.g. `18 486 €`. Non-finite values
/// render as zero.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value.round() } else { 0.0 };
    let digits = format!("{:.0}", value.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}{CURRENCY_SUFFIX}")
}

/// Fraction as a one-decimal percentage: `0.06` -> `6.0%`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", round_half_up_tenth(fraction * 100.0))
}

pub fn format_years_to_fi(years: Option<f64>, max_horizon_years: u32) -> String {
    match years {
        Some(years) => format!("{:.1} ans", round_half_up_tenth(years)),
        None => format!("Non atteint en {max_horizon_years} ans"),
    }
}

// Ties go up, matching the one-decimal KPI text of the web calculator.
fn round_half_up_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
