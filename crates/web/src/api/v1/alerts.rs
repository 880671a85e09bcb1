use axum::{
    extract::{OriginalUri, Query, State},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use model::breach::BreachEvent;
use serde::Deserialize;

use crate::{
    common::{
        route_not_found, schema, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/schema", get(schema::<BreachEvent>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertsQuery {
    /// Replay cursor: only events with an id strictly greater than this
    /// are returned. Defaults to 0 (everything).
    #[serde(default)]
    since: u64,
}

async fn list(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Query(params): Query<AlertsQuery>,
) -> RouteResult<Json<VecResponse<BreachEvent>>> {
    let events = engine.alerts_since(params.since).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;
    Ok(VecResponse::new(events).json())
}
