//! Row ordering for display.
//!
//! Rows are compared on, in order:
//! 1. item family priority (first keyword of the priority list the item contains;
//!    items matching none go last, alphabetically by name),
//! 2. note rank (certified, no note, other note, then processing notes in list order),
//! 3. first number in the note (none sorts last),
//! 4. first number in the spec (none sorts last).
//!
//! The sort is stable, so remaining ties keep input order.

use shared::models::PriceTable;
use std::cmp::Ordering;

use crate::config::rules::PricingRules;
use crate::data::tokens::first_number;

const RANK_CERTIFIED: usize = 0;
const RANK_NO_NOTE: usize = 1;
const RANK_OTHER_NOTE: usize = 2;
const RANK_FIRST_PROCESSED: usize = 3;

/// Borrowed view of one row for sorting.
#[derive(Debug, Clone, Copy)]
pub struct SortEntry<'a> {
    pub item: &'a str,
    pub spec: &'a str,
    pub note: Option<&'a str>,
}

#[derive(Debug, PartialEq)]
struct SortKey<'a> {
    priority: usize,
    /// Only set for items outside the priority list.
    fallback_name: Option<&'a str>,
    note_rank: usize,
    note_number: f64,
    spec_number: f64,
}

impl SortKey<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.fallback_name.cmp(&other.fallback_name))
            .then_with(|| self.note_rank.cmp(&other.note_rank))
            .then_with(|| self.note_number.total_cmp(&other.note_number))
            .then_with(|| self.spec_number.total_cmp(&other.spec_number))
    }
}

pub struct NaturalSorter {
    item_priority: Vec<String>,
    certified_markers: Vec<String>,
    processed_markers: Vec<String>,
}

impl NaturalSorter {
    pub fn from_rules(rules: &PricingRules) -> Self {
        NaturalSorter {
            item_priority: rules.item_priority.clone(),
            certified_markers: rules.certified_markers.clone(),
            processed_markers: rules.processed_markers.clone(),
        }
    }

    /// Position of the first priority keyword contained in `item`.
    pub fn item_priority(&self, item: &str) -> Option<usize> {
        self.item_priority
            .iter()
            .position(|k| !k.is_empty() && item.contains(k.as_str()))
    }

    pub fn note_rank(&self, note: Option<&str>) -> usize {
        let note = match note.map(str::trim) {
            None | Some("") => return RANK_NO_NOTE,
            Some(n) => n,
        };
        if self.certified_markers.iter().any(|m| !m.is_empty() && note.contains(m.as_str())) {
            return RANK_CERTIFIED;
        }
        match self
            .processed_markers
            .iter()
            .position(|m| !m.is_empty() && note.contains(m.as_str()))
        {
            Some(pos) => RANK_FIRST_PROCESSED + pos,
            None => RANK_OTHER_NOTE,
        }
    }

    fn key<'a>(&self, entry: &SortEntry<'a>) -> SortKey<'a> {
        let priority = self.item_priority(entry.item);
        SortKey {
            priority: priority.unwrap_or(usize::MAX),
            fallback_name: if priority.is_none() { Some(entry.item) } else { None },
            note_rank: self.note_rank(entry.note),
            note_number: entry.note.and_then(first_number).unwrap_or(f64::INFINITY),
            spec_number: first_number(entry.spec).unwrap_or(f64::INFINITY),
        }
    }

    /// Returns the positions of `entries` in display order.
    pub fn order(&self, entries: &[SortEntry<'_>]) -> Vec<usize> {
        let keys: Vec<SortKey<'_>> = entries.iter().map(|e| self.key(e)).collect();
        let mut positions: Vec<usize> = (0..entries.len()).collect();
        positions.sort_by(|&a, &b| keys[a].compare(&keys[b]));
        positions
    }

    pub fn sort_table(&self, table: &mut PriceTable) {
        let order = {
            let entries: Vec<SortEntry<'_>> = table
                .rows()
                .iter()
                .map(|row| SortEntry { item: &row.key.item, spec: &row.key.spec, note: row.note.as_deref() })
                .collect();
            self.order(&entries)
        };
        table.reorder_rows(&order);
    }
}
