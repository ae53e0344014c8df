// Conversions between domain types and generated gRPC messages.
use shared::models::{ComparisonKey, PriceHistoryPoint, PriceRow, QuoteLine, SheetKind};

use crate::data::price_table::cheapest_vendor;
use crate::data::spec_combiner::EMPTY_SPEC;
use crate::error::EngineError;
use crate::services::{HistoryPoint, ProtoPriceRow, ProtoQuoteLine, QuoteResponse};
use crate::session::QuoteSession;

pub fn parse_sheet(raw: &str) -> Result<SheetKind, EngineError> {
    raw.parse::<SheetKind>()
        .map_err(|e| EngineError::InvalidRequest(e.to_string()))
}

pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Key as a client sends it; a blank spec means the "-" placeholder.
pub fn key_from(item: &str, spec: &str) -> ComparisonKey {
    let spec = spec.trim();
    ComparisonKey::new(item.trim(), if spec.is_empty() { EMPTY_SPEC } else { spec })
}

pub fn to_proto_row(vendors: &[String], row: &PriceRow) -> ProtoPriceRow {
    ProtoPriceRow {
        item: row.key.item.clone(),
        spec: row.key.spec.clone(),
        note: row.note.clone().unwrap_or_default(),
        unit: row.unit.clone().unwrap_or_default(),
        prices: row.prices.clone(),
        cheapest_vendor: cheapest_vendor(vendors, row).unwrap_or_default().to_string(),
    }
}

pub fn to_proto_line(line: &QuoteLine) -> ProtoQuoteLine {
    ProtoQuoteLine {
        item: line.key.item.clone(),
        spec: line.key.spec.clone(),
        quantity: line.quantity,
    }
}

pub fn to_proto_history(point: &PriceHistoryPoint) -> HistoryPoint {
    HistoryPoint {
        item: point.key.item.clone(),
        spec: point.key.spec.clone(),
        vendor: point.vendor.clone(),
        date: point.date.format("%Y-%m-%d").to_string(),
        price: point.price,
    }
}

pub fn quote_response(session: &QuoteSession, success: bool, message: String) -> QuoteResponse {
    QuoteResponse {
        success,
        message,
        lines: session.lines().iter().map(to_proto_line).collect(),
        hidden_rows: session.hidden_count() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn blank_spec_maps_to_placeholder() {
        assert_eq!(key_from(" PP로프 ", "  "), ComparisonKey::new("PP로프", "-"));
        assert_eq!(key_from("안전망", " 2 x 3 "), ComparisonKey::new("안전망", "2 x 3"));
    }

    #[test]
    fn unknown_sheet_is_invalid_request() {
        assert!(matches!(parse_sheet("stock"), Err(EngineError::InvalidRequest(_))));
        assert_eq!(parse_sheet("").unwrap(), SheetKind::Purchase);
    }

    #[test]
    fn history_date_is_iso() {
        let point = PriceHistoryPoint {
            key: ComparisonKey::new("X", "-"),
            vendor: "A".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            price: 10.0,
        };
        assert_eq!(to_proto_history(&point).date, "2024-03-09");
    }
}
