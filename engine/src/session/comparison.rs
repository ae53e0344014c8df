//! Quote totals per vendor.
//!
//! Each quote line contributes `price * quantity` to every vendor that bid on its
//! row. A vendor with no bid on a line is not charged for it; the line is counted
//! in `missing_lines` instead, and such a vendor is not eligible as cheapest.

use shared::models::{ComparisonKey, PriceTable, QuoteLine};
use std::collections::HashMap;

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct VendorTotal {
    pub vendor: String,
    pub total: f64,
    pub missing_lines: usize,
}

impl VendorTotal {
    pub fn is_complete(&self) -> bool {
        self.missing_lines == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineComparison {
    pub key: ComparisonKey,
    pub quantity: u32,
    /// Only vendors with a bid on this row appear.
    pub subtotals: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteComparison {
    /// In the order the vendors were requested.
    pub totals: Vec<VendorTotal>,
    pub lines: Vec<LineComparison>,
    /// Lowest total among vendors that priced every line.
    pub cheapest: Option<String>,
    /// How much the cheapest complete vendor saves over the next cheapest complete one.
    pub difference: f64,
}

impl QuoteComparison {
    pub fn total_for(&self, vendor: &str) -> Option<f64> {
        self.totals.iter().find(|t| t.vendor == vendor).map(|t| t.total)
    }
}

/// Compares `lines` across `vendors` (every table vendor when empty).
///
/// Fails with [`EngineError::MissingData`] when fewer than two distinct vendors are
/// being compared and [`EngineError::NotFound`] for a vendor the table does not have.
pub fn compare_quote(
    table: &PriceTable,
    lines: &[QuoteLine],
    vendors: &[String],
) -> Result<QuoteComparison, EngineError> {
    let mut selected: Vec<String> = Vec::new();
    let requested: Vec<String> = if vendors.is_empty() { table.vendors().to_vec() } else { vendors.to_vec() };
    for vendor in requested {
        let vendor = vendor.trim().to_string();
        if !table.vendors().contains(&vendor) {
            return Err(EngineError::NotFound(format!("Vendor '{}' is not in the price table", vendor)));
        }
        if !selected.contains(&vendor) {
            selected.push(vendor);
        }
    }
    if selected.len() < 2 {
        return Err(EngineError::MissingData(format!(
            "At least two vendors are needed for a comparison, found {}",
            selected.len()
        )));
    }

    let mut totals: Vec<VendorTotal> = selected
        .iter()
        .map(|v| VendorTotal { vendor: v.clone(), total: 0.0, missing_lines: 0 })
        .collect();
    let mut compared = Vec::with_capacity(lines.len());

    for line in lines {
        let row = table.get(&line.key);
        let mut subtotals = HashMap::new();
        for total in totals.iter_mut() {
            match row.and_then(|r| r.price(&total.vendor)) {
                Some(price) => {
                    let subtotal = price * f64::from(line.quantity);
                    total.total += subtotal;
                    subtotals.insert(total.vendor.clone(), subtotal);
                }
                None => total.missing_lines += 1,
            }
        }
        compared.push(LineComparison { key: line.key.clone(), quantity: line.quantity, subtotals });
    }

    let (cheapest, difference) = if lines.is_empty() {
        (None, 0.0)
    } else {
        let mut complete: Vec<&VendorTotal> = totals.iter().filter(|t| t.is_complete()).collect();
        complete.sort_by(|a, b| a.total.total_cmp(&b.total));
        match complete.as_slice() {
            [] => (None, 0.0),
            [only] => (Some(only.vendor.clone()), 0.0),
            [best, next, ..] => (Some(best.vendor.clone()), next.total - best.total),
        }
    };

    tracing::debug!(
        vendors = selected.len(),
        lines = lines.len(),
        cheapest = cheapest.as_deref().unwrap_or(""),
        difference,
        "Compared quote"
    );

    Ok(QuoteComparison { totals, lines: compared, cheapest, difference })
}
