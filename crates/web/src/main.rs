use std::sync::Arc;

use database::MemoryStore;
use geofence::ingest::{IngestConfig, IngestService};
use web::{start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let store = MemoryStore::new();
    let engine = IngestService::new(store, IngestConfig::default())
        .await
        .expect("could not start the geofencing engine.");

    log::info!("listening on 0.0.0.0:8080");
    let web_future = start_web_server(WebState {
        engine: Arc::new(engine),
    });

    let _ = web_future.await;
}
