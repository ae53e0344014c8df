// Handler for the GetPriceTable RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::{key_from, non_empty, parse_sheet, to_proto_row};
use crate::data::price_book::PriceBookStore;
use crate::ordering::SortDirection;
use crate::pipeline::{ColumnSort, PipelineOptions, PricePipeline};
use crate::services::{PriceTableRequest, PriceTableResponse};
use crate::session::SessionStore;

pub async fn handle_get_price_table(
    req_payload: PriceTableRequest,
    price_books: Arc<RwLock<PriceBookStore>>,
    sessions: Arc<RwLock<SessionStore>>,
    pipeline: Arc<PricePipeline>,
) -> Result<Response<PriceTableResponse>, Status> {
    let sheet = parse_sheet(&req_payload.sheet)?;
    let options = PipelineOptions {
        unit_price: req_payload.unit_price,
        item_filter: non_empty(&req_payload.item_filter),
        sort_columns: req_payload.sort_columns.map(|s| ColumnSort {
            key: key_from(&s.item, &s.spec),
            direction: if s.descending { SortDirection::Descending } else { SortDirection::Ascending },
        }),
    };

    // Snapshot of the session so no session lock is held while the pipeline runs.
    let session = match non_empty(&req_payload.session_id) {
        Some(id) => Some(sessions.read().await.get(&id)?.clone()),
        None => None,
    };

    let store = price_books.read().await;
    let loaded = store.require(sheet)?;
    let table = pipeline.run(&loaded.table, &options, session.as_ref())?;
    drop(store);

    let vendors = table.vendors().to_vec();
    let rows = table.rows().iter().map(|row| to_proto_row(&vendors, row)).collect::<Vec<_>>();
    tracing::debug!(sheet = %sheet, rows = rows.len(), vendors = vendors.len(), "Serving price table (handler)");

    Ok(Response::new(PriceTableResponse { vendors, rows }))
}
