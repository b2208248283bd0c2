//! German-locale display formatting for the values the core computes.

use chrono::NaiveDate;

/// Format an amount as euros the way the de-DE locale does:
/// `1234.5` → `"1.234,50 €"`. Non-finite input formats as zero.
#[must_use]
pub fn format_currency_eur(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{},{:02} €", group_thousands(cents / 100), cents % 100)
}

/// Signed percentage with two decimals: `5.2` → `"+5.20%"`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    // -0.0 would print as "+-0.00%"
    let value = if value.is_finite() && value != 0.0 { value } else { 0.0 };
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

/// `dd.mm.yyyy`
#[must_use]
pub fn format_date_de(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
