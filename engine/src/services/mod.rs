// gRPC surface of the engine. Message and service types are generated from proto/pricing.proto.
pub mod pricing {
    tonic::include_proto!("pricing");
}

pub use pricing::price_compare_server::{PriceCompare, PriceCompareServer};
pub use pricing::{
    CloseSessionRequest, CloseSessionResponse, CompareQuoteRequest, CompareQuoteResponse, HistoryPoint, LoadSheetRequest, LoadSheetResponse,
    OpenSessionRequest, OpenSessionResponse, PriceHistoryRequest, PriceHistoryResponse,
    PriceRow as ProtoPriceRow, PriceTableRequest, PriceTableResponse, QuoteLine as ProtoQuoteLine,
    QuoteLineComparison, QuoteResponse, QuoteUpdateRequest, SortColumns,
    VendorTotal as ProtoVendorTotal,
};

pub mod price_service;
