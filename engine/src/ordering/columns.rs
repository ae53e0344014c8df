// Vendor column order driven by one reference row.
use shared::models::{ComparisonKey, PriceTable};
use std::cmp::Ordering;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Vendors ordered by their price on the `key` row.
///
/// Missing, zero and non-finite prices always go last, keeping their current
/// column order, whichever direction is requested.
pub fn sort_vendors_by_row(
    table: &PriceTable,
    key: &ComparisonKey,
    direction: SortDirection,
) -> Result<Vec<String>, EngineError> {
    let row = table
        .get(key)
        .ok_or_else(|| EngineError::NotFound(format!("Reference row {} is not in the table", key)))?;

    let mut vendors: Vec<String> = table.vendors().to_vec();
    vendors.sort_by(|a, b| compare_prices(row.price(a), row.price(b), direction));
    Ok(vendors)
}

/// Compares two optional prices the way the column sort does (missing last).
pub fn compare_prices(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    let valid = |p: Option<f64>| p.filter(|v| v.is_finite() && *v != 0.0);
    match (valid(a), valid(b)) {
        (Some(x), Some(y)) => match direction {
            SortDirection::Ascending => x.total_cmp(&y),
            SortDirection::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
