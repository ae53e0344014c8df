// Number and cell helpers shared across the engine and clients.

/// Parsing and formatting of Korean-style price cells ("35,000", "35,000원").
pub mod korean_format {
    use anyhow::{anyhow, Result};
    use std::str::FromStr;

    /// Returns true for cells a spreadsheet export leaves behind for "no value".
    pub fn is_blank_cell(s: &str) -> bool {
        let trimmed = s.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
    }

    /// Parses an amount such as "35,000", " 33000 " or "1,200원" into f64.
    pub fn parse_amount(s: &str) -> Result<f64> {
        if is_blank_cell(s) {
            return Err(anyhow!("Empty amount"));
        }
        let normalized: String = s
            .trim()
            .trim_end_matches('원')
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        let value = f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse amount '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Amount '{}' is not a finite number", s));
        }
        Ok(value)
    }

    /// Formats an amount with thousands separators, dropping the fraction when it is zero.
    pub fn format_amount(value: f64) -> String {
        let negative = value < 0.0;
        let cents = (value.abs() * 100.0).round() as u64;
        let whole = cents / 100;
        let frac = cents % 100;

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        if frac > 0 {
            out.push_str(&format!(".{:02}", frac));
        }
        out
    }

}
