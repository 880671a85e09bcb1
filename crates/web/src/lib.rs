pub use crate::common::RouteResult;

use std::sync::Arc;

use axum::{extract::FromRef, Router};
use database::MemoryStore;
use geofence::ingest::IngestService;
use tokio::net::TcpListener;

pub mod api;
pub mod common;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub engine: Arc<IngestService<MemoryStore>>,
}

pub async fn start_web_server(state: WebState) -> std::io::Result<()> {
    let routes = Router::new().nest_service("/api", api::routes(state));

    let listener = TcpListener::bind("0.0.0.0:8080").await?;
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}
