// In-memory cache of loaded sheets, one snapshot per sheet kind.
use chrono::{DateTime, Utc};
use shared::models::{PriceHistoryPoint, PriceRecord, PriceTable, SheetKind};
use std::collections::HashMap;

use super::csv_parser::ParsedSheet;
use super::price_table::{build_price_table, melt_history};
use crate::error::EngineError;

/// A loaded sheet: raw records plus the pivot built from them.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub sheet: SheetKind,
    pub source: String,
    pub records: Vec<PriceRecord>,
    pub table: PriceTable,
    pub history: Vec<PriceHistoryPoint>,
    pub dropped_rows: usize,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedSheet {
    pub fn from_parsed(sheet: SheetKind, source: impl Into<String>, parsed: ParsedSheet) -> Self {
        let table = build_price_table(&parsed.records);
        let history = melt_history(&parsed.records);
        LoadedSheet {
            sheet,
            source: source.into(),
            records: parsed.records,
            table,
            history,
            dropped_rows: parsed.dropped_rows,
            loaded_at: Utc::now(),
        }
    }
}

/// Filter for history lookups; `None` matches anything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub item: Option<String>,
    pub spec: Option<String>,
    pub vendor: Option<String>,
}

impl HistoryFilter {
    fn matches(&self, point: &PriceHistoryPoint) -> bool {
        self.item.as_ref().map_or(true, |item| &point.key.item == item)
            && self.spec.as_ref().map_or(true, |spec| &point.key.spec == spec)
            && self.vendor.as_ref().map_or(true, |vendor| &point.vendor == vendor)
    }
}

pub struct PriceBookStore {
    sheets: HashMap<SheetKind, LoadedSheet>,
}

impl PriceBookStore {
    pub fn new() -> Self {
        PriceBookStore { sheets: HashMap::new() }
    }

    /// Stores a freshly loaded sheet, replacing (and returning) the previous snapshot.
    pub fn insert(&mut self, loaded: LoadedSheet) -> Option<LoadedSheet> {
        self.sheets.insert(loaded.sheet, loaded)
    }

    pub fn get(&self, sheet: SheetKind) -> Option<&LoadedSheet> {
        self.sheets.get(&sheet)
    }

    pub fn require(&self, sheet: SheetKind) -> Result<&LoadedSheet, EngineError> {
        self.get(sheet).ok_or(EngineError::SheetNotLoaded(sheet))
    }

    /// History points for `sheet` matching `filter`, ordered by key, vendor, then date.
    pub fn history(&self, sheet: SheetKind, filter: &HistoryFilter) -> Result<Vec<PriceHistoryPoint>, EngineError> {
        let loaded = self.require(sheet)?;
        let mut points: Vec<PriceHistoryPoint> = loaded
            .history
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        points.sort_by(|a, b| {
            (&a.key, &a.vendor, a.date).cmp(&(&b.key, &b.vendor, b.date))
        });
        Ok(points)
    }
}

impl Default for PriceBookStore {
    fn default() -> Self {
        Self::new()
    }
}
