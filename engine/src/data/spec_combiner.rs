// Collapses the spec columns of one record into the display string used in the comparison key.
use shared::utils::korean_format::is_blank_cell;

/// Placeholder for records whose spec columns are all blank.
pub const EMPTY_SPEC: &str = "-";

/// Joins the non-blank, non-"NaN" spec values (trimmed) with single spaces, in column order.
pub fn combine_spec<S: AsRef<str>>(values: &[S]) -> String {
    let parts: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !is_blank_cell(v))
        .collect();

    if parts.is_empty() {
        EMPTY_SPEC.to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_in_column_order() {
        assert_eq!(combine_spec(&["10kg", "box"]), "10kg box");
    }

    #[test]
    fn skips_blank_and_nan_cells() {
        assert_eq!(combine_spec(&["  2 x 3 ", "", "NaN", "nan", "녹색"]), "2 x 3 녹색");
    }

    #[test]
    fn all_blank_gives_placeholder() {
        assert_eq!(combine_spec(&["", "NaN"]), EMPTY_SPEC);
        assert_eq!(combine_spec::<&str>(&[]), EMPTY_SPEC);
    }
}
