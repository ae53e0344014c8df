// Handler for the LoadPriceSheet RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::parse_sheet;
use crate::config::settings::EngineSettings;
use crate::data::csv_parser::PriceSheetParser;
use crate::data::price_book::{LoadedSheet, PriceBookStore};
use crate::error::EngineError;
use crate::services::{LoadSheetRequest, LoadSheetResponse};

pub async fn handle_load_price_sheet(
    req_payload: LoadSheetRequest,
    price_books: Arc<RwLock<PriceBookStore>>,
    settings: Arc<EngineSettings>,
) -> Result<Response<LoadSheetResponse>, Status> {
    let sheet = parse_sheet(&req_payload.sheet)?;
    let path = match req_payload.file_path.trim() {
        "" => settings.data.default_path(sheet).to_string(),
        explicit => explicit.to_string(),
    };

    let parser = PriceSheetParser::from_settings(&settings)?;
    // File reading, parsing and the history melt are synchronous work.
    let source = path.clone();
    let loaded = tokio::task::spawn_blocking(move || -> Result<LoadedSheet, EngineError> {
        let parsed = parser.load_from_path(&source)?;
        Ok(LoadedSheet::from_parsed(sheet, source, parsed))
    })
    .await
    .map_err(|e| EngineError::from(anyhow::Error::from(e)))??;

    let vendors = loaded.table.vendors().to_vec();
    let rows = loaded.table.len() as i32;
    let records_loaded = loaded.records.len() as i32;
    let records_dropped = loaded.dropped_rows as i32;

    let mut store = price_books.write().await;
    let previous = store.insert(loaded);
    drop(store);
    let replaced = previous.is_some();

    let mut message = format!(
        "Loaded {} records ({} rows, {} vendors) into the {} sheet from {}",
        records_loaded, rows, vendors.len(), sheet, path
    );
    if records_dropped > 0 {
        message.push_str(&format!("; skipped {} incomplete rows", records_dropped));
    }
    if let Some(previous) = &previous {
        message.push_str(&format!(
            "; replaced the snapshot loaded at {}",
            previous.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if vendors.len() < 2 {
        tracing::warn!(sheet = %sheet, vendors = vendors.len(), "Fewer than two vendors loaded; comparison unavailable");
        message.push_str("; warning: fewer than two vendors, comparison is unavailable");
    }

    tracing::info!(sheet = %sheet, path = %path, records_loaded, records_dropped, rows, replaced, "Price sheet loaded");
    Ok(Response::new(LoadSheetResponse {
        success: true,
        message,
        records_loaded,
        records_dropped,
        rows,
        vendors,
    }))
}
