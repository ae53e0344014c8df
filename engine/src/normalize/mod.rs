// Unit-price normalization: divide each vendor price by a unit count parsed from the spec.
pub mod area;
pub mod piece_count;
pub mod star_length;

use shared::models::PriceTable;
use std::collections::HashMap;

use crate::config::rules::{DivisorKind, PricingRules};
use area::AreaDivisor;
use piece_count::PieceCountDivisor;
use star_length::StarLengthDivisor;

/// Common trait for the ways a spec string encodes the selling unit.
pub trait UnitDivisor: Send + Sync {
    fn name(&self) -> &str;
    /// Divisor read from `spec`, or `None` when the expected number is not there.
    fn raw_divisor(&self, spec: &str) -> Option<f64>;
}

pub fn divisor_for_kind(kind: DivisorKind) -> Box<dyn UnitDivisor> {
    match kind {
        DivisorKind::Area => Box::new(AreaDivisor),
        DivisorKind::LengthAfterStar => Box::new(StarLengthDivisor),
        DivisorKind::PieceCount => Box::new(PieceCountDivisor),
    }
}

struct KeywordRule {
    keywords: Vec<String>,
    divisor: Box<dyn UnitDivisor>,
}

/// Applies the first divisor rule whose keyword appears in the item name.
/// Items matching no rule are left as they are.
pub struct UnitPriceNormalizer {
    rules: Vec<KeywordRule>,
}

impl UnitPriceNormalizer {
    pub fn from_rules(rules: &PricingRules) -> Self {
        let rules = rules
            .divisor_rules
            .iter()
            .map(|rule| KeywordRule { keywords: rule.keywords.clone(), divisor: divisor_for_kind(rule.kind) })
            .collect();
        UnitPriceNormalizer { rules }
    }

    fn rule_for(&self, item: &str) -> Option<&KeywordRule> {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| !k.is_empty() && item.contains(k.as_str())))
    }

    /// Always strictly positive: a missing, zero or non-finite divisor becomes 1.
    pub fn divisor_for(&self, item: &str, spec: &str) -> f64 {
        let raw = self.rule_for(item).and_then(|rule| rule.divisor.raw_divisor(spec));
        match raw {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => 1.0,
        }
    }

    /// Divides every price in `prices` in place and returns the divisor used.
    pub fn normalize_prices(&self, item: &str, spec: &str, prices: &mut HashMap<String, f64>) -> f64 {
        let divisor = self.divisor_for(item, spec);
        if divisor != 1.0 {
            for price in prices.values_mut() {
                *price /= divisor;
            }
        }
        divisor
    }

    pub fn normalize_table(&self, table: &mut PriceTable) {
        let mut converted = 0usize;
        for row in table.rows_mut() {
            let divisor = self.normalize_prices(&row.key.item, &row.key.spec, &mut row.prices);
            if divisor != 1.0 {
                converted += 1;
            } else if let Some(rule) = self.rule_for(&row.key.item) {
                tracing::trace!(key = %row.key, rule = rule.divisor.name(), "Unit count is missing or 1; price kept");
            }
        }
        tracing::debug!(rows = table.len(), converted, "Converted table to unit prices");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::price_table::build_price_table;
    use proptest::prelude::*;
    use shared::models::{ComparisonKey, PriceRecord};

    fn normalizer() -> UnitPriceNormalizer {
        UnitPriceNormalizer::from_rules(&PricingRules::default())
    }

    #[test]
    fn safety_net_divides_by_area() {
        let n = normalizer();
        assert_eq!(n.divisor_for("안전망", "2 x 3"), 6.0);
        assert_eq!(n.divisor_for("멀티망(녹색)", "10 x 5"), 50.0);

        let mut prices = HashMap::from([("A".to_string(), 600.0)]);
        n.normalize_prices("안전망", "2 x 3", &mut prices);
        assert_eq!(prices["A"], 100.0);
    }

    #[test]
    fn wire_rope_divides_by_length_after_star() {
        let n = normalizer();
        let mut prices = HashMap::from([("A".to_string(), 5000.0)]);
        assert_eq!(n.normalize_prices("와이어로프", "PE * 50", &mut prices), 50.0);
        assert_eq!(prices["A"], 100.0);
    }

    #[test]
    fn wire_clip_divides_by_first_number() {
        assert_eq!(normalizer().divisor_for("와이어클립", "100개 12mm"), 100.0);
    }

    #[test]
    fn other_items_are_untouched() {
        let n = normalizer();
        assert_eq!(n.divisor_for("럿셀망", "2 x 3"), 1.0);
        assert_eq!(n.divisor_for("PP로프", "8mm * 200"), 1.0);
    }

    #[test]
    fn missing_or_zero_numbers_fall_back_to_one() {
        let n = normalizer();
        assert_eq!(n.divisor_for("안전망", "대형"), 1.0);
        assert_eq!(n.divisor_for("안전망", "0 x 5"), 1.0);
        assert_eq!(n.divisor_for("와이어로프", "6mm 200M"), 1.0);
        assert_eq!(n.divisor_for("와이어클립", "-"), 1.0);
    }

    #[test]
    fn normalize_table_leaves_missing_cells_absent() {
        let records = vec![PriceRecord {
            vendor: "A".to_string(),
            item: "안전망".to_string(),
            specs: vec!["2 x 3".to_string()],
            price: 600.0,
            note: None,
            unit: None,
            history: vec![],
        }];
        let mut table = build_price_table(&records);
        normalizer().normalize_table(&mut table);
        let key = ComparisonKey::new("안전망", "2 x 3");
        assert_eq!(table.price(&key, "A"), Some(100.0));
        assert_eq!(table.price(&key, "B"), None);
    }

    proptest! {
        #[test]
        fn divisor_is_positive_and_reversible(
            w in 0u32..500,
            h in 0u32..500,
            price in 1.0f64..1_000_000.0,
            item in prop::sample::select(vec!["안전망", "와이어로프", "와이어클립", "럿셀망"]),
        ) {
            let spec = format!("{} x {} * {}", w, h, w);
            let n = normalizer();
            let divisor = n.divisor_for(item, &spec);
            prop_assert!(divisor > 0.0);
            let unit = price / divisor;
            prop_assert!(((unit * divisor) - price).abs() <= price * 1e-9);
        }
    }
}
