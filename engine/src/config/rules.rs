//! Business keyword tables: which headers map to which column role, how items are
//! prioritized for display, and which items carry a unit divisor in their spec.
//!
//! The constants are the defaults; `PricingRules` lets a config file override them.

use serde::{Deserialize, Serialize};

pub const VENDOR_COLUMN_ALIASES: &[&str] = &["업체", "거래처", "공급사", "매입처"];
pub const ITEM_COLUMN_ALIASES: &[&str] = &["품명", "품목", "제품명"];
pub const PRICE_COLUMN_ALIASES: &[&str] = &["단가", "매입가", "가격"];
pub const SPEC_COLUMN_ALIASES: &[&str] = &["규격"];
pub const NOTE_COLUMN_ALIASES: &[&str] = &["비고", "메모"];
pub const UNIT_COLUMN_ALIASES: &[&str] = &["단위"];

/// Header prefix of dated price columns, e.g. `단가_2024-03-01`.
pub const DEFAULT_HISTORY_PREFIX: &str = "단가_";

/// Display priority of item families, earliest first.
pub const ITEM_PRIORITY: &[&str] = &["안전망", "멀티망", "럿셀망", "PP로프", "와이어로프", "와이어클립"];

pub const CERTIFIED_NOTE_MARKERS: &[&str] = &["인증", "KS"];
/// Processing notes, sorted after everything else in this order.
pub const PROCESSED_NOTE_MARKERS: &[&str] = &["코팅", "가공"];

pub const AREA_DIVISOR_ITEMS: &[&str] = &["안전망", "멀티망"];
pub const LENGTH_DIVISOR_ITEMS: &[&str] = &["와이어로프"];
pub const PIECE_DIVISOR_ITEMS: &[&str] = &["와이어클립"];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// How a spec string encodes the unit an item is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisorKind {
    /// Product of every number in the spec (width x height).
    Area,
    /// Number right after `*` (length in meters).
    LengthAfterStar,
    /// First number in the spec (pieces per pack).
    PieceCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisorRuleConfig {
    pub keywords: Vec<String>,
    pub kind: DivisorKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub vendor: Vec<String>,
    pub item: Vec<String>,
    pub price: Vec<String>,
    pub spec: Vec<String>,
    pub note: Vec<String>,
    pub unit: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        ColumnAliases {
            vendor: owned(VENDOR_COLUMN_ALIASES),
            item: owned(ITEM_COLUMN_ALIASES),
            price: owned(PRICE_COLUMN_ALIASES),
            spec: owned(SPEC_COLUMN_ALIASES),
            note: owned(NOTE_COLUMN_ALIASES),
            unit: owned(UNIT_COLUMN_ALIASES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    pub columns: ColumnAliases,
    pub item_priority: Vec<String>,
    pub certified_markers: Vec<String>,
    pub processed_markers: Vec<String>,
    /// Checked in order; the first rule with a keyword contained in the item name applies.
    pub divisor_rules: Vec<DivisorRuleConfig>,
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            columns: ColumnAliases::default(),
            item_priority: owned(ITEM_PRIORITY),
            certified_markers: owned(CERTIFIED_NOTE_MARKERS),
            processed_markers: owned(PROCESSED_NOTE_MARKERS),
            divisor_rules: vec![
                DivisorRuleConfig { keywords: owned(AREA_DIVISOR_ITEMS), kind: DivisorKind::Area },
                DivisorRuleConfig { keywords: owned(LENGTH_DIVISOR_ITEMS), kind: DivisorKind::LengthAfterStar },
                DivisorRuleConfig { keywords: owned(PIECE_DIVISOR_ITEMS), kind: DivisorKind::PieceCount },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_default_tables() {
        let rules: PricingRules = serde_json::from_str(r#"{ "item_priority": ["PP로프"] }"#).unwrap();
        assert_eq!(rules.item_priority, vec!["PP로프".to_string()]);
        assert_eq!(rules.columns, ColumnAliases::default());
        assert_eq!(rules.divisor_rules.len(), 3);
    }

    #[test]
    fn divisor_kind_uses_snake_case_names() {
        let rule: DivisorRuleConfig =
            serde_json::from_str(r#"{ "keywords": ["와이어로프"], "kind": "length_after_star" }"#).unwrap();
        assert_eq!(rule.kind, DivisorKind::LengthAfterStar);
    }
}
