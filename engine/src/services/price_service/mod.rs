// engine/src/services/price_service/mod.rs
// The PriceCompare gRPC service: shared state plus one handler module per RPC.

use super::{
    CloseSessionRequest, CloseSessionResponse, CompareQuoteRequest, CompareQuoteResponse, LoadSheetRequest, LoadSheetResponse, OpenSessionRequest,
    OpenSessionResponse, PriceCompare, PriceHistoryRequest, PriceHistoryResponse, PriceTableRequest,
    PriceTableResponse, QuoteResponse, QuoteUpdateRequest,
};
use crate::config::settings::EngineSettings;
use crate::data::price_book::PriceBookStore;
use crate::error::EngineError;
use crate::pipeline::PricePipeline;
use crate::session::SessionStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod compare_quote;
pub mod get_price_history;
pub mod get_price_table;
pub mod helpers;
pub mod load_price_sheet;
pub mod update_quote;

pub struct PriceCompareEngine {
    price_books: Arc<RwLock<PriceBookStore>>,
    sessions: Arc<RwLock<SessionStore>>,
    settings: Arc<EngineSettings>,
    pipeline: Arc<PricePipeline>,
}

impl PriceCompareEngine {
    pub fn new(
        settings: EngineSettings,
        price_books: Arc<RwLock<PriceBookStore>>,
        sessions: Arc<RwLock<SessionStore>>,
    ) -> Self {
        let pipeline = Arc::new(PricePipeline::new(&settings.rules));
        PriceCompareEngine { price_books, sessions, settings: Arc::new(settings), pipeline }
    }
}

#[tonic::async_trait]
impl PriceCompare for PriceCompareEngine {
    async fn load_price_sheet(&self, request: Request<LoadSheetRequest>) -> Result<Response<LoadSheetResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            sheet = %req_payload.sheet,
            path = %req_payload.file_path,
            "Received LoadSheetRequest, dispatching to handler."
        );
        load_price_sheet::handle_load_price_sheet(req_payload, self.price_books.clone(), self.settings.clone()).await
    }

    async fn get_price_table(&self, request: Request<PriceTableRequest>) -> Result<Response<PriceTableResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            sheet = %req_payload.sheet,
            unit_price = req_payload.unit_price,
            item_filter = %req_payload.item_filter,
            "Received PriceTableRequest, dispatching to handler."
        );
        get_price_table::handle_get_price_table(
            req_payload,
            self.price_books.clone(),
            self.sessions.clone(),
            self.pipeline.clone(),
        )
        .await
    }

    type GetPriceHistoryStream = ReceiverStream<Result<PriceHistoryResponse, Status>>;
    async fn get_price_history(
        &self,
        request: Request<PriceHistoryRequest>,
    ) -> Result<Response<Self::GetPriceHistoryStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            sheet = %req_payload.sheet,
            item = %req_payload.item,
            vendor = %req_payload.vendor,
            "Received PriceHistoryRequest, dispatching to handler."
        );
        get_price_history::handle_get_price_history(req_payload, self.price_books.clone()).await
    }

    async fn open_session(&self, _request: Request<OpenSessionRequest>) -> Result<Response<OpenSessionResponse>, Status> {
        let session_id = self.sessions.write().await.open();
        tracing::info!(session_id = %session_id, "Opened quote session");
        Ok(Response::new(OpenSessionResponse { session_id }))
    }

    async fn close_session(&self, request: Request<CloseSessionRequest>) -> Result<Response<CloseSessionResponse>, Status> {
        let req_payload = request.into_inner();
        let remaining = {
            let mut sessions = self.sessions.write().await;
            if !sessions.close(&req_payload.session_id) {
                return Err(EngineError::SessionError(format!("Unknown session '{}'", req_payload.session_id)).into());
            }
            sessions.len()
        };
        tracing::info!(session_id = %req_payload.session_id, remaining, "Closed quote session");
        Ok(Response::new(CloseSessionResponse { success: true, message: "Session closed".to_string() }))
    }

    async fn update_quote(&self, request: Request<QuoteUpdateRequest>) -> Result<Response<QuoteResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            session_id = %req_payload.session_id,
            action = %req_payload.action,
            item = %req_payload.item,
            quantity = req_payload.quantity,
            "Received QuoteUpdateRequest, dispatching to handler."
        );
        update_quote::handle_update_quote(req_payload, self.sessions.clone()).await
    }

    async fn compare_quote(&self, request: Request<CompareQuoteRequest>) -> Result<Response<CompareQuoteResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            session_id = %req_payload.session_id,
            sheet = %req_payload.sheet,
            vendors = ?req_payload.vendors,
            "Received CompareQuoteRequest, dispatching to handler."
        );
        compare_quote::handle_compare_quote(
            req_payload,
            self.price_books.clone(),
            self.sessions.clone(),
            self.pipeline.clone(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SortColumns;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_stream::StreamExt;

    const SHEET: &str = "\
업체,품명,규격,단가,비고,단가_2024-01-01
VendorA,Apple,10kg,35000,,34000
VendorB,Apple,10kg,33000,,
VendorA,안전망,2 x 3,600,KS인증,
VendorB,안전망,2 x 3,\"660\",,
VendorB,와이어로프,PE * 50,5000,,
VendorC,PP로프,,,,";

    fn create_test_engine() -> PriceCompareEngine {
        PriceCompareEngine::new(
            EngineSettings::default(),
            Arc::new(RwLock::new(PriceBookStore::new())),
            Arc::new(RwLock::new(SessionStore::new())),
        )
    }

    fn create_dummy_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    async fn create_loaded_engine() -> (PriceCompareEngine, NamedTempFile) {
        let engine = create_test_engine();
        let tmp_file = create_dummy_csv(SHEET);
        let request = Request::new(LoadSheetRequest {
            file_path: tmp_file.path().to_str().unwrap().to_string(),
            sheet: "purchase".to_string(),
        });
        engine.load_price_sheet(request).await.unwrap();
        (engine, tmp_file)
    }

    async fn open(engine: &PriceCompareEngine) -> String {
        engine.open_session(Request::new(OpenSessionRequest {})).await.unwrap().into_inner().session_id
    }

    async fn update(engine: &PriceCompareEngine, session_id: &str, action: &str, item: &str, spec: &str, quantity: u32) -> QuoteResponse {
        let request = Request::new(QuoteUpdateRequest {
            session_id: session_id.to_string(),
            action: action.to_string(),
            item: item.to_string(),
            spec: spec.to_string(),
            quantity,
        });
        engine.update_quote(request).await.unwrap().into_inner()
    }

    fn table_request(session_id: &str) -> PriceTableRequest {
        PriceTableRequest {
            sheet: "purchase".to_string(),
            unit_price: false,
            item_filter: String::new(),
            session_id: session_id.to_string(),
            sort_columns: None,
        }
    }

    #[tokio::test]
    async fn test_load_price_sheet_success() {
        let engine = create_test_engine();
        let tmp_file = create_dummy_csv(SHEET);
        let request = Request::new(LoadSheetRequest {
            file_path: tmp_file.path().to_str().unwrap().to_string(),
            sheet: "매입".to_string(),
        });
        let response = engine.load_price_sheet(request).await.unwrap().into_inner();
        assert!(response.success);
        assert_eq!(response.records_loaded, 5);
        assert_eq!(response.records_dropped, 1);
        assert_eq!(response.rows, 3);
        assert_eq!(response.vendors, vec!["VendorA", "VendorB"]);
        assert!(response.message.contains("skipped 1 incomplete rows"));
    }

    #[tokio::test]
    async fn test_reloading_a_sheet_reports_the_replaced_snapshot() {
        let (engine, tmp_file) = create_loaded_engine().await;
        let request = Request::new(LoadSheetRequest {
            file_path: tmp_file.path().to_str().unwrap().to_string(),
            sheet: "purchase".to_string(),
        });
        let response = engine.load_price_sheet(request).await.unwrap().into_inner();
        assert!(response.message.contains("replaced the snapshot loaded at"));
    }

    #[tokio::test]
    async fn test_load_price_sheet_file_not_found() {
        let engine = create_test_engine();
        let request = Request::new(LoadSheetRequest { file_path: "non_existent_sheet.csv".to_string(), sheet: String::new() });
        let status = engine.load_price_sheet(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("I/O error"));
    }

    #[tokio::test]
    async fn test_load_price_sheet_missing_column() {
        let engine = create_test_engine();
        let tmp_file = create_dummy_csv("업체,품명,규격\nVendorA,Apple,10kg");
        let request = Request::new(LoadSheetRequest {
            file_path: tmp_file.path().to_str().unwrap().to_string(),
            sheet: "purchase".to_string(),
        });
        let status = engine.load_price_sheet(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("price column"));
    }

    #[tokio::test]
    async fn test_load_single_vendor_warns() {
        let engine = create_test_engine();
        let tmp_file = create_dummy_csv("업체,품명,단가\nVendorA,Apple,100");
        let request = Request::new(LoadSheetRequest {
            file_path: tmp_file.path().to_str().unwrap().to_string(),
            sheet: "sales".to_string(),
        });
        let response = engine.load_price_sheet(request).await.unwrap().into_inner();
        assert!(response.success);
        assert!(response.message.contains("fewer than two vendors"));
    }

    #[tokio::test]
    async fn test_get_price_table_requires_loaded_sheet() {
        let engine = create_test_engine();
        let status = engine.get_price_table(Request::new(table_request(""))).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
    }

    #[tokio::test]
    async fn test_get_price_table_natural_order_and_cheapest() {
        let (engine, _file) = create_loaded_engine().await;
        let response = engine.get_price_table(Request::new(table_request(""))).await.unwrap().into_inner();
        let items: Vec<&str> = response.rows.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, vec!["안전망", "와이어로프", "Apple"]);
        assert_eq!(response.rows[0].note, "KS인증");
        assert_eq!(response.rows[0].cheapest_vendor, "VendorA");
        assert_eq!(response.rows[2].cheapest_vendor, "VendorB");
        assert!(!response.rows[1].prices.contains_key("VendorA"));
    }

    #[tokio::test]
    async fn test_get_price_table_unit_price_and_column_sort() {
        let (engine, _file) = create_loaded_engine().await;
        let mut request = table_request("");
        request.unit_price = true;
        request.sort_columns = Some(SortColumns { item: "안전망".to_string(), spec: "2 x 3".to_string(), descending: true });
        let response = engine.get_price_table(Request::new(request)).await.unwrap().into_inner();
        assert_eq!(response.vendors, vec!["VendorB", "VendorA"]);
        assert_eq!(response.rows[0].prices["VendorA"], 100.0);
        assert_eq!(response.rows[0].prices["VendorB"], 110.0);
        assert_eq!(response.rows[1].prices["VendorB"], 100.0);
    }

    #[tokio::test]
    async fn test_hidden_rows_only_affect_their_session() {
        let (engine, _file) = create_loaded_engine().await;
        let mine = open(&engine).await;
        let other = open(&engine).await;
        let response = update(&engine, &mine, "HIDE", "Apple", "10kg", 0).await;
        assert!(response.success);
        assert_eq!(response.hidden_rows, 1);

        let my_table = engine.get_price_table(Request::new(table_request(&mine))).await.unwrap().into_inner();
        let other_table = engine.get_price_table(Request::new(table_request(&other))).await.unwrap().into_inner();
        assert_eq!(my_table.rows.len(), 2);
        assert_eq!(other_table.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_quote_flow_and_comparison() {
        let (engine, _file) = create_loaded_engine().await;
        let session_id = open(&engine).await;
        update(&engine, &session_id, "ADD", "Apple", "10kg", 1).await;
        let response = update(&engine, &session_id, "add", "Apple", "10kg", 1).await;
        assert!(response.success);
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].quantity, 2);

        let request = Request::new(CompareQuoteRequest {
            session_id: session_id.clone(),
            sheet: "purchase".to_string(),
            vendors: vec![],
            unit_price: false,
        });
        let comparison = engine.compare_quote(request).await.unwrap().into_inner();
        let totals: Vec<(&str, f64)> = comparison.totals.iter().map(|t| (t.vendor.as_str(), t.total)).collect();
        assert_eq!(totals, vec![("VendorA", 70000.0), ("VendorB", 66000.0)]);
        assert_eq!(comparison.cheapest_vendor, "VendorB");
        assert_eq!(comparison.difference, 4000.0);
        assert!(comparison.message.contains("VendorB is cheapest at 66,000"));
        assert!(comparison.message.contains("saving 4,000"));
        assert_eq!(comparison.lines[0].subtotals["VendorB"], 66000.0);
    }

    #[tokio::test]
    async fn test_update_quote_rejections_are_reported() {
        let (engine, _file) = create_loaded_engine().await;
        let session_id = open(&engine).await;

        let response = update(&engine, &session_id, "REMOVE", "Apple", "10kg", 0).await;
        assert!(!response.success);
        assert!(response.message.contains("not in the quote list"));

        let response = update(&engine, &session_id, "ADD", "", "", 1).await;
        assert!(!response.success);
        assert_eq!(response.message, "Invalid request: Item is required for ADD");

        let response = update(&engine, &session_id, "FOOBAZ", "Apple", "10kg", 1).await;
        assert!(!response.success);
        assert!(response.message.contains("Unsupported action 'FOOBAZ'"));

        update(&engine, &session_id, "ADD", "Apple", "10kg", 0).await;
        let response = update(&engine, &session_id, "SET", "Apple", "10kg", 0).await;
        assert!(!response.success);
        assert_eq!(response.lines[0].quantity, 1);

        let response = update(&engine, &session_id, "CLEAR", "", "", 0).await;
        assert!(response.success);
        assert!(response.lines.is_empty());
    }

    #[tokio::test]
    async fn test_update_quote_unknown_session() {
        let engine = create_test_engine();
        let request = Request::new(QuoteUpdateRequest {
            session_id: "missing".to_string(),
            action: "ADD".to_string(),
            item: "Apple".to_string(),
            spec: "10kg".to_string(),
            quantity: 1,
        });
        let status = engine.update_quote(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_closed_session_is_gone() {
        let (engine, _file) = create_loaded_engine().await;
        let session_id = open(&engine).await;
        let request = Request::new(CloseSessionRequest { session_id: session_id.clone() });
        let response = engine.close_session(request).await.unwrap().into_inner();
        assert!(response.success);
        assert!(engine.sessions.read().await.is_empty());

        let request = Request::new(QuoteUpdateRequest {
            session_id: session_id.clone(),
            action: "ADD".to_string(),
            item: "Apple".to_string(),
            spec: "10kg".to_string(),
            quantity: 1,
        });
        assert_eq!(engine.update_quote(request).await.unwrap_err().code(), tonic::Code::NotFound);

        let status = engine.close_session(Request::new(CloseSessionRequest { session_id })).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_compare_quote_with_one_vendor_is_failed_precondition() {
        let (engine, _file) = create_loaded_engine().await;
        let session_id = open(&engine).await;
        let request = Request::new(CompareQuoteRequest {
            session_id,
            sheet: "purchase".to_string(),
            vendors: vec!["VendorA".to_string()],
            unit_price: false,
        });
        let status = engine.compare_quote(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        assert!(status.message().contains("At least two vendors"));
    }

    #[tokio::test]
    async fn test_get_price_history_streams_points() {
        let (engine, _file) = create_loaded_engine().await;
        let request = Request::new(PriceHistoryRequest {
            sheet: "purchase".to_string(),
            item: "Apple".to_string(),
            spec: String::new(),
            vendor: String::new(),
        });
        let mut stream = engine.get_price_history(request).await.unwrap().into_inner();
        let response = stream.next().await.unwrap().unwrap();
        assert_eq!(response.points.len(), 1);
        assert_eq!(response.points[0].vendor, "VendorA");
        assert_eq!(response.points[0].date, "2024-01-01");
        assert_eq!(response.points[0].price, 34000.0);
        assert!(stream.next().await.is_none());
    }
}
