// Engine main entry point
use engine::config::settings::EngineSettings;
use engine::data::price_book::PriceBookStore;
use engine::services::price_service::PriceCompareEngine;
use engine::services::PriceCompareServer;
use engine::session::SessionStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = EngineSettings::load()?;
    engine::logging::init(&settings.log_level)?;

    info!("Starting Price Compare Engine...");
    let addr = settings.listen_addr().parse()?;
    info!("Engine will listen on {}", addr);

    // Sheet snapshots and quote sessions live for the lifetime of the process.
    let price_books = Arc::new(RwLock::new(PriceBookStore::new()));
    let sessions = Arc::new(RwLock::new(SessionStore::new()));

    let price_compare_service = PriceCompareEngine::new(settings, price_books, sessions);

    Server::builder()
        .add_service(PriceCompareServer::new(price_compare_service))
        .serve(addr)
        .await?;

    Ok(())
}
