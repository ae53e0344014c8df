use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One row of a raw price sheet after column resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub vendor: String,
    pub item: String,
    /// Raw spec cells in column order; may contain blanks.
    pub specs: Vec<String>,
    pub price: f64,
    pub note: Option<String>,
    pub unit: Option<String>,
    /// Melted history columns, in column order.
    #[serde(default)]
    pub history: Vec<(NaiveDate, f64)>,
}

/// Identity of one comparable product line: item name plus combined spec string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComparisonKey {
    pub item: String,
    pub spec: String,
}

impl ComparisonKey {
    pub fn new(item: impl Into<String>, spec: impl Into<String>) -> Self {
        ComparisonKey { item: item.into(), spec: spec.into() }
    }
}

impl fmt::Display for ComparisonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.item, self.spec)
    }
}

/// One wide-format row: a comparison key and the price each vendor bid for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub key: ComparisonKey,
    pub note: Option<String>,
    pub unit: Option<String>,
    /// Vendors with no bid are absent, never zero.
    pub prices: HashMap<String, f64>,
}

impl PriceRow {
    fn new(key: ComparisonKey) -> Self {
        PriceRow { key, note: None, unit: None, prices: HashMap::new() }
    }

    pub fn price(&self, vendor: &str) -> Option<f64> {
        self.prices.get(vendor).copied()
    }
}

/// Item × vendor price table.
///
/// Rows and vendors keep first-seen order until a caller reorders them.
/// A `(key, vendor)` cell is written at most once: later inserts for the same
/// cell are ignored.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    vendors: Vec<String>,
    rows: Vec<PriceRow>,
    index: HashMap<ComparisonKey, usize>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `price` for `(key, vendor)` unless that cell already holds a price.
    /// Returns whether the price was stored.
    pub fn insert_first(&mut self, key: ComparisonKey, vendor: &str, price: f64) -> bool {
        if !self.vendors.iter().any(|v| v == vendor) {
            self.vendors.push(vendor.to_string());
        }
        let row = self.row_entry(key);
        if row.prices.contains_key(vendor) {
            return false;
        }
        row.prices.insert(vendor.to_string(), price);
        true
    }

    /// Returns the row for `key`, creating an empty one at the end if needed.
    pub fn row_entry(&mut self, key: ComparisonKey) -> &mut PriceRow {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.rows.len();
                self.index.insert(key.clone(), idx);
                self.rows.push(PriceRow::new(key));
                idx
            }
        };
        &mut self.rows[idx]
    }

    pub fn get(&self, key: &ComparisonKey) -> Option<&PriceRow> {
        self.index.get(key).map(|&idx| &self.rows[idx])
    }

    pub fn price(&self, key: &ComparisonKey, vendor: &str) -> Option<f64> {
        self.get(key).and_then(|row| row.price(vendor))
    }

    pub fn vendors(&self) -> &[String] {
        &self.vendors
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [PriceRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every stored `(key, vendor, price)` cell, row by row in vendor column order.
    pub fn flatten(&self) -> Vec<(ComparisonKey, String, f64)> {
        let mut cells = Vec::new();
        for row in &self.rows {
            for vendor in &self.vendors {
                if let Some(price) = row.price(vendor) {
                    cells.push((row.key.clone(), vendor.clone(), price));
                }
            }
        }
        cells
    }

    /// Keeps only rows matching `keep`, preserving their relative order.
    pub fn retain_rows<F: FnMut(&PriceRow) -> bool>(&mut self, keep: F) {
        self.rows.retain(keep);
        self.rebuild_index();
    }

    /// Reorders rows by a permutation of row positions (as produced by a sorter).
    /// Positions out of range or repeated are ignored.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        let mut taken = vec![false; self.rows.len()];
        let mut slots: Vec<Option<PriceRow>> = self.rows.drain(..).map(Some).collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for &pos in order {
            if pos < slots.len() && !taken[pos] {
                taken[pos] = true;
                if let Some(row) = slots[pos].take() {
                    reordered.push(row);
                }
            }
        }
        // Anything the permutation skipped keeps its place at the tail.
        reordered.extend(slots.into_iter().flatten());
        self.rows = reordered;
        self.rebuild_index();
    }

    /// Replaces the vendor column order. Vendors not present in the table are ignored
    /// and vendors missing from `order` are appended in their previous order.
    pub fn set_vendor_order(&mut self, order: Vec<String>) {
        let mut vendors: Vec<String> = order
            .into_iter()
            .filter(|v| self.vendors.contains(v))
            .collect();
        vendors.dedup();
        for v in &self.vendors {
            if !vendors.contains(v) {
                vendors.push(v.clone());
            }
        }
        self.vendors = vendors;
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.key.clone(), idx))
            .collect();
    }
}

/// A line of a manual quote: which product and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub key: ComparisonKey,
    pub quantity: u32,
}

/// One historical price observation melted out of a dated price column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub key: ComparisonKey,
    pub vendor: String,
    pub date: NaiveDate,
    pub price: f64,
}

/// Which sheet of the workbook a table was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    /// Buy-side prices (매입).
    Purchase,
    /// Sales prices (매출).
    Sales,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Purchase => "purchase",
            SheetKind::Sales => "sales",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "purchase" | "buy" | "매입" => Ok(SheetKind::Purchase),
            "sales" | "sell" | "매출" => Ok(SheetKind::Sales),
            other => Err(anyhow::anyhow!("Unknown sheet '{}'. Use 'purchase' or 'sales'.", other)),
        }
    }
}
