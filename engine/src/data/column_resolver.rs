//! Maps sheet headers to column roles by substring match.
//!
//! Each role scans the headers left to right and takes the first unclaimed header
//! containing one of its aliases. Spec columns are every unclaimed header containing
//! a spec alias. Dated price columns (`<prefix><date>`) are set aside first and never
//! claimed by a role.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

use crate::config::rules::ColumnAliases;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Vendor,
    Item,
    Price,
    Spec,
    Note,
    Unit,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnRole::Vendor => "vendor",
            ColumnRole::Item => "item",
            ColumnRole::Price => "price",
            ColumnRole::Spec => "spec",
            ColumnRole::Note => "note",
            ColumnRole::Unit => "unit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryColumn {
    pub index: usize,
    pub name: String,
    pub date: NaiveDate,
}

/// Typed view of a sheet's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub vendor: ResolvedColumn,
    pub item: ResolvedColumn,
    pub price: ResolvedColumn,
    pub specs: Vec<ResolvedColumn>,
    pub note: Option<ResolvedColumn>,
    pub unit: Option<ResolvedColumn>,
    pub history: Vec<HistoryColumn>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"];
const MONTH_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

/// Parses the date-like tail of a history header. Month-only suffixes map to the 1st.
pub fn parse_date_suffix(suffix: &str) -> Option<NaiveDate> {
    let suffix = suffix.trim().trim_start_matches(['_', '-', ' ']);
    if suffix.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(suffix, fmt).ok())
        .or_else(|| {
            // "2024-03" / "2024.03" / "2024/03"
            let sep = suffix.chars().nth(4)?;
            let padded = format!("{}{}01", suffix, sep);
            MONTH_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&padded, fmt).ok())
        })
}

fn history_date(header: &str, prefix: &str) -> Option<NaiveDate> {
    if prefix.is_empty() {
        return None;
    }
    header.strip_prefix(prefix).and_then(parse_date_suffix)
}

struct Resolver<'a> {
    headers: Vec<&'a str>,
    claimed: HashSet<usize>,
}

impl<'a> Resolver<'a> {
    fn matches(header: &str, aliases: &[String]) -> bool {
        aliases.iter().any(|alias| !alias.is_empty() && header.contains(alias.as_str()))
    }

    fn claim_first(&mut self, aliases: &[String]) -> Option<ResolvedColumn> {
        let found = self
            .headers
            .iter()
            .enumerate()
            .find(|(idx, header)| !self.claimed.contains(idx) && Self::matches(header, aliases))
            .map(|(idx, header)| ResolvedColumn { index: idx, name: header.to_string() })?;
        self.claimed.insert(found.index);
        Some(found)
    }

    fn claim_all(&mut self, aliases: &[String]) -> Vec<ResolvedColumn> {
        let found: Vec<ResolvedColumn> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, header)| !self.claimed.contains(idx) && Self::matches(header, aliases))
            .map(|(idx, header)| ResolvedColumn { index: idx, name: header.to_string() })
            .collect();
        self.claimed.extend(found.iter().map(|c| c.index));
        found
    }

    fn require(&mut self, role: ColumnRole, aliases: &[String]) -> Result<ResolvedColumn, EngineError> {
        self.claim_first(aliases).ok_or(EngineError::MissingColumn { role })
    }
}

/// Resolves `headers` into a [`ColumnSchema`].
///
/// Fails with [`EngineError::MissingColumn`] when vendor, item or price cannot be found.
pub fn resolve_columns<S: AsRef<str>>(
    headers: &[S],
    aliases: &ColumnAliases,
    history_prefix: &str,
) -> Result<ColumnSchema, EngineError> {
    let headers: Vec<&str> = headers
        .iter()
        .map(|h| h.as_ref().trim_start_matches('\u{feff}').trim())
        .collect();

    let history: Vec<HistoryColumn> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| {
            history_date(header, history_prefix).map(|date| HistoryColumn { index: idx, name: header.to_string(), date })
        })
        .collect();

    let mut resolver = Resolver {
        headers,
        claimed: history.iter().map(|h| h.index).collect(),
    };

    let vendor = resolver.require(ColumnRole::Vendor, &aliases.vendor)?;
    let item = resolver.require(ColumnRole::Item, &aliases.item)?;
    let price = resolver.require(ColumnRole::Price, &aliases.price)?;
    let specs = resolver.claim_all(&aliases.spec);
    let note = resolver.claim_first(&aliases.note);
    let unit = resolver.claim_first(&aliases.unit);

    Ok(ColumnSchema { vendor, item, price, specs, note, unit, history })
}
