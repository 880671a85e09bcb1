use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    routing::{get, on, post},
    Json, Router,
};
use model::location::LocationSample;
use utility::id::Id;

use crate::{
    common::{
        route_not_found, schema, RouteErrorResponse, RouteResult,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", post(submit))
        .route("/schema", get(schema::<LocationSample>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

pub(crate) fn tourist_routes(state: WebState) -> Router {
    Router::new()
        .route("/:id", post(register))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Submit one location sample. The response carries the breach events
/// this sample produced.
async fn submit(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Json(sample): Json<LocationSample>,
) -> RouteResult<Json<geofence::ingest::SubmitOutcome>> {
    let outcome = engine.submit(sample).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
    })?;
    Ok(Json(outcome))
}

/// Pre-register a tourist. Only required when the engine runs with
/// `require_registration`.
async fn register(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Path(id): Path<String>,
) -> RouteResult<Json<serde_json::Value>> {
    let tourist = Id::from(id.as_str());
    engine.register(&tourist).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
    })?;
    Ok(Json(serde_json::json!({ "registered": tourist })))
}
