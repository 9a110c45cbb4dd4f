use super::types::Currency;

/// Rounds to cents, half up, when `enabled`; otherwise returns `value` untouched.
pub fn round_money(value: f64, enabled: bool) -> f64 {
    if !enabled {
        return value;
    }
    ((value + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}

/// Parses user-typed amounts such as `£1,250.50`. Everything other than
/// digits and `.` is dropped, so signs are ignored. Returns NaN for empty
/// input or more than one decimal point.
pub fn parse_number_loose(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() || cleaned.matches('.').count() > 1 {
        return f64::NAN;
    }
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn format_currency(amount: f64, currency: Currency) -> String {
    let value = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.*}", currency.decimals(), value.abs());
    let sign = if value < 0.0 && fixed.chars().any(|c| matches!(c, '1'..='9')) {
        "-"
    } else {
        ""
    };
    let (int_part, dec_part) = match fixed.split_once('.') {
        Some((int_part, dec_part)) => (int_part, Some(dec_part)),
        None => (fixed.as_str(), None),
    };
    let grouped = group_thousands(int_part);
    match dec_part {
        Some(dec) => format!("{sign}{}{grouped}.{dec}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}

pub fn format_percent(apr: f64) -> String {
    if !apr.is_finite() {
        return "—".to_string();
    }
    format!("{}%", (apr * 100.0).round() / 100.0)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_money_rounds_half_up_only_when_enabled() {
        assert_eq!(round_money(1.005, true), 1.01);
        assert_eq!(round_money(2.344, true), 2.34);
        assert_eq!(round_money(2.3456, true), 2.35);
        assert_eq!(round_money(2.344, false), 2.344);
    }

    #[test]
    fn parse_number_loose_strips_symbols_and_separators() {
        assert_eq!(parse_number_loose("£1,250.50"), 1250.5);
        assert_eq!(parse_number_loose(" 42 "), 42.0);
        assert_eq!(parse_number_loose("-15"), 15.0);
        assert!(parse_number_loose("").is_nan());
        assert!(parse_number_loose("abc").is_nan());
        assert!(parse_number_loose("1.2.3").is_nan());
        assert!(parse_number_loose(".").is_nan());
    }

    #[test]
    fn format_currency_groups_thousands_with_symbol() {
        assert_eq!(format_currency(1234567.891, Currency::Gbp), "£1,234,567.89");
        assert_eq!(format_currency(999.5, Currency::Usd), "$999.50");
        assert_eq!(format_currency(-1500.0, Currency::Eur), "-€1,500.00");
        assert_eq!(format_currency(0.0, Currency::Inr), "₹0.00");
        assert_eq!(format_currency(f64::NAN, Currency::Gbp), "£0.00");
    }

    #[test]
    fn format_percent_trims_trailing_zeros() {
        assert_eq!(format_percent(24.0), "24%");
        assert_eq!(format_percent(29.9), "29.9%");
        assert_eq!(format_percent(f64::NAN), "—");
    }
}
