//! The single parameterized pipeline behind every table view:
//! filter -> hide session rows -> unit prices -> natural row order -> column order.
//!
//! Always starts from the loaded snapshot and never mutates it, so each call is a
//! full recomputation.

use shared::models::{ComparisonKey, PriceTable};

use crate::config::rules::PricingRules;
use crate::error::EngineError;
use crate::normalize::UnitPriceNormalizer;
use crate::ordering::{sort_vendors_by_row, NaturalSorter, SortDirection};
use crate::session::QuoteSession;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSort {
    pub key: ComparisonKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    /// Divide prices by the unit count parsed from the spec.
    pub unit_price: bool,
    /// Case-insensitive substring match on item or spec.
    pub item_filter: Option<String>,
    pub sort_columns: Option<ColumnSort>,
}

pub struct PricePipeline {
    normalizer: UnitPriceNormalizer,
    sorter: NaturalSorter,
}

impl PricePipeline {
    pub fn new(rules: &PricingRules) -> Self {
        PricePipeline {
            normalizer: UnitPriceNormalizer::from_rules(rules),
            sorter: NaturalSorter::from_rules(rules),
        }
    }

    pub fn run(
        &self,
        base: &PriceTable,
        options: &PipelineOptions,
        session: Option<&QuoteSession>,
    ) -> Result<PriceTable, EngineError> {
        let mut table = base.clone();

        if let Some(filter) = options.item_filter.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            let needle = filter.to_lowercase();
            table.retain_rows(|row| {
                row.key.item.to_lowercase().contains(&needle) || row.key.spec.to_lowercase().contains(&needle)
            });
        }

        if let Some(session) = session {
            if session.hidden_count() > 0 {
                table.retain_rows(|row| !session.is_hidden(&row.key));
            }
        }

        if options.unit_price {
            self.normalizer.normalize_table(&mut table);
        }

        self.sorter.sort_table(&mut table);

        if let Some(sort) = &options.sort_columns {
            let order = sort_vendors_by_row(&table, &sort.key, sort.direction)?;
            table.set_vendor_order(order);
        }

        tracing::debug!(
            rows = table.len(),
            vendors = table.vendors().len(),
            unit_price = options.unit_price,
            "Pipeline produced table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::price_table::build_price_table;
    use shared::models::PriceRecord;

    fn record(vendor: &str, item: &str, spec: &str, price: f64) -> PriceRecord {
        PriceRecord {
            vendor: vendor.to_string(),
            item: item.to_string(),
            specs: vec![spec.to_string()],
            price,
            note: None,
            unit: None,
            history: vec![],
        }
    }

    fn base() -> PriceTable {
        build_price_table(&[
            record("A", "PP로프", "8mm", 1000.0),
            record("A", "안전망", "2 x 3", 600.0),
            record("B", "안전망", "2 x 3", 540.0),
            record("C", "와이어로프", "PE * 50", 5000.0),
            record("B", "와이어로프", "PE * 50", 4500.0),
        ])
    }

    fn pipeline() -> PricePipeline {
        PricePipeline::new(&PricingRules::default())
    }

    #[test]
    fn default_run_sorts_rows_without_touching_prices() {
        let base = base();
        let table = pipeline().run(&base, &PipelineOptions::default(), None).unwrap();
        let items: Vec<&str> = table.rows().iter().map(|r| r.key.item.as_str()).collect();
        assert_eq!(items, vec!["안전망", "PP로프", "와이어로프"]);
        assert_eq!(table.price(&ComparisonKey::new("안전망", "2 x 3"), "A"), Some(600.0));
        // Snapshot is untouched.
        assert_eq!(base.rows()[0].key.item, "PP로프");
    }

    #[test]
    fn unit_price_option_normalizes() {
        let options = PipelineOptions { unit_price: true, ..Default::default() };
        let table = pipeline().run(&base(), &options, None).unwrap();
        assert_eq!(table.price(&ComparisonKey::new("안전망", "2 x 3"), "A"), Some(100.0));
        assert_eq!(table.price(&ComparisonKey::new("와이어로프", "PE * 50"), "C"), Some(100.0));
        assert_eq!(table.price(&ComparisonKey::new("PP로프", "8mm"), "A"), Some(1000.0));
    }

    #[test]
    fn filter_and_hidden_rows_are_dropped() {
        let mut session = QuoteSession::new();
        session.hide(ComparisonKey::new("와이어로프", "PE * 50"));
        let options = PipelineOptions { item_filter: Some(" 로프 ".to_string()), ..Default::default() };
        let table = pipeline().run(&base(), &options, Some(&session)).unwrap();
        let items: Vec<&str> = table.rows().iter().map(|r| r.key.item.as_str()).collect();
        assert_eq!(items, vec!["PP로프"]);
    }

    #[test]
    fn column_sort_reorders_vendors() {
        let options = PipelineOptions {
            sort_columns: Some(ColumnSort {
                key: ComparisonKey::new("안전망", "2 x 3"),
                direction: SortDirection::Ascending,
            }),
            ..Default::default()
        };
        let table = pipeline().run(&base(), &options, None).unwrap();
        assert_eq!(table.vendors(), ["B".to_string(), "A".to_string(), "C".to_string()]);
    }

    #[test]
    fn column_sort_on_filtered_out_row_is_not_found() {
        let options = PipelineOptions {
            item_filter: Some("PP".to_string()),
            sort_columns: Some(ColumnSort {
                key: ComparisonKey::new("안전망", "2 x 3"),
                direction: SortDirection::Descending,
            }),
            ..Default::default()
        };
        assert!(matches!(pipeline().run(&base(), &options, None), Err(EngineError::NotFound(_))));
    }
}
