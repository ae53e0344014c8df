// Handler for the GetPriceHistory RPC
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::{non_empty, parse_sheet, to_proto_history};
use crate::data::price_book::{HistoryFilter, PriceBookStore};
use crate::services::{HistoryPoint, PriceHistoryRequest, PriceHistoryResponse};

pub async fn handle_get_price_history(
    req_payload: PriceHistoryRequest,
    price_books: Arc<RwLock<PriceBookStore>>,
) -> Result<Response<ReceiverStream<Result<PriceHistoryResponse, Status>>>, Status> {
    let sheet = parse_sheet(&req_payload.sheet)?;
    let filter = HistoryFilter {
        item: non_empty(&req_payload.item),
        spec: non_empty(&req_payload.spec),
        vendor: non_empty(&req_payload.vendor),
    };

    let store = price_books.read().await;
    let points = store.history(sheet, &filter)?;
    drop(store);

    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        if points.is_empty() {
            tracing::warn!(sheet = %sheet, ?filter, "No price history matches the request (handler).");
        }
        let points: Vec<HistoryPoint> = points.iter().map(to_proto_history).collect();
        tracing::debug!(sheet = %sheet, count = points.len(), "Streaming price history (handler).");
        if let Err(e) = tx.send(Ok(PriceHistoryResponse { points })).await {
            tracing::error!(error = ?e, sheet = %sheet, "Failed to send price history to stream (handler)");
        }
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}
