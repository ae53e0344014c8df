// Pivot builder: long price records -> wide item x vendor table.
use std::collections::HashSet;

use chrono::NaiveDate;
use shared::models::{ComparisonKey, PriceHistoryPoint, PriceRecord, PriceRow, PriceTable};

use super::spec_combiner::combine_spec;

/// The key a record is compared under: trimmed item name plus combined spec string.
pub fn comparison_key(record: &PriceRecord) -> ComparisonKey {
    ComparisonKey::new(record.item.trim(), combine_spec(&record.specs))
}

/// Builds the comparison table. The first price seen for a `(key, vendor)` cell wins;
/// later duplicates are ignored. Rows and vendors keep first-seen order.
pub fn build_price_table(records: &[PriceRecord]) -> PriceTable {
    let mut table = PriceTable::new();
    let mut ignored = 0usize;

    for record in records {
        let key = comparison_key(record);
        let vendor = record.vendor.trim();

        {
            let row = table.row_entry(key.clone());
            if row.note.is_none() {
                row.note = record.note.clone().filter(|n| !n.trim().is_empty());
            }
            if row.unit.is_none() {
                row.unit = record.unit.clone().filter(|u| !u.trim().is_empty());
            }
        }

        if !table.insert_first(key, vendor, record.price) {
            ignored += 1;
        }
    }

    if ignored > 0 {
        tracing::debug!(ignored, "Duplicate (item, spec, vendor) records ignored; first price kept");
    }
    table
}

/// Melts dated price columns into one point per (record, date).
/// Follows the same first-wins rule as the table for duplicate `(key, vendor, date)`.
pub fn melt_history(records: &[PriceRecord]) -> Vec<PriceHistoryPoint> {
    let mut points: Vec<PriceHistoryPoint> = Vec::new();
    let mut seen: HashSet<(ComparisonKey, String, NaiveDate)> = HashSet::new();
    for record in records {
        if record.history.is_empty() {
            continue;
        }
        let key = comparison_key(record);
        let vendor = record.vendor.trim();
        for (date, price) in &record.history {
            if seen.insert((key.clone(), vendor.to_string(), *date)) {
                points.push(PriceHistoryPoint {
                    key: key.clone(),
                    vendor: vendor.to_string(),
                    date: *date,
                    price: *price,
                });
            }
        }
    }
    points
}

/// Vendor with the lowest strictly positive price on `row`, scanning in the table's
/// vendor column order so ties go to the earlier column.
pub fn cheapest_vendor<'a>(vendors: &'a [String], row: &PriceRow) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for vendor in vendors {
        let Some(price) = row.price(vendor) else { continue };
        if !price.is_finite() || price <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_price)) if best_price <= price => {}
            _ => best = Some((vendor.as_str(), price)),
        }
    }
    best.map(|(vendor, _)| vendor)
}
