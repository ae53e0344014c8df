// Numeric tokens embedded in spec and note strings ("10 x 5", "PE * 50", "KS 3.5mm").
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

static STAR_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\s*(\d+(?:\.\d+)?)").expect("star-number pattern is valid"));

/// Every number in `s`, left to right.
pub fn numeric_tokens(s: &str) -> Vec<f64> {
    NUMBER_REGEX
        .find_iter(s)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// The first number in `s`, if any.
pub fn first_number(s: &str) -> Option<f64> {
    NUMBER_REGEX.find(s).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// The number immediately following the first `*` in `s` (whitespace allowed between).
pub fn number_after_star(s: &str) -> Option<f64> {
    STAR_NUMBER_REGEX
        .captures(s)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
