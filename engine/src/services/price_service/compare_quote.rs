// Handler for the CompareQuote RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::parse_sheet;
use crate::data::price_book::PriceBookStore;
use crate::pipeline::{PipelineOptions, PricePipeline};
use crate::services::{CompareQuoteRequest, CompareQuoteResponse, ProtoVendorTotal, QuoteLineComparison};
use crate::session::{compare_quote, SessionStore};
use shared::utils::korean_format::format_amount;

pub async fn handle_compare_quote(
    req_payload: CompareQuoteRequest,
    price_books: Arc<RwLock<PriceBookStore>>,
    sessions: Arc<RwLock<SessionStore>>,
    pipeline: Arc<PricePipeline>,
) -> Result<Response<CompareQuoteResponse>, Status> {
    let sheet = parse_sheet(&req_payload.sheet)?;
    let lines = sessions.read().await.get(&req_payload.session_id)?.lines().to_vec();

    let options = PipelineOptions { unit_price: req_payload.unit_price, ..Default::default() };
    let store = price_books.read().await;
    let table = pipeline.run(&store.require(sheet)?.table, &options, None)?;
    drop(store);

    let comparison = compare_quote(&table, &lines, &req_payload.vendors)?;

    let message = match (&comparison.cheapest, lines.is_empty()) {
        (_, true) => "The quote list is empty".to_string(),
        (Some(vendor), false) => {
            let total = format_amount(comparison.total_for(vendor).unwrap_or_default());
            if comparison.difference > 0.0 {
                format!(
                    "{} is cheapest at {}, saving {} over the next vendor",
                    vendor,
                    total,
                    format_amount(comparison.difference)
                )
            } else {
                format!("{} is cheapest at {}", vendor, total)
            }
        }
        (None, false) => "No vendor priced every line of the quote".to_string(),
    };
    tracing::info!(session_id = %req_payload.session_id, sheet = %sheet, lines = lines.len(), message = %message, "Quote compared (handler)");

    Ok(Response::new(CompareQuoteResponse {
        totals: comparison
            .totals
            .iter()
            .map(|t| ProtoVendorTotal { vendor: t.vendor.clone(), total: t.total, missing_lines: t.missing_lines as i32 })
            .collect(),
        lines: comparison
            .lines
            .iter()
            .map(|l| QuoteLineComparison {
                item: l.key.item.clone(),
                spec: l.key.spec.clone(),
                quantity: l.quantity,
                subtotals: l.subtotals.clone(),
            })
            .collect(),
        cheapest_vendor: comparison.cheapest.clone().unwrap_or_default(),
        difference: comparison.difference,
        message,
    }))
}
