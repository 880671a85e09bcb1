use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use chrono::{DateTime, Utc};
use geofence::analytics::{BreachReport, OccupancyReport};
use model::{breach::BreachEvent, DateTimeRange};
use serde::Deserialize;
use utility::{id::Id, serde::date_time};

use crate::{
    common::{
        route_not_found, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/occupancy", get(occupancy))
        .route("/breaches", get(breaches))
        .route("/tourists/:id", get(tourist_history))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowQuery {
    #[serde(deserialize_with = "date_time::deserialize_utc")]
    start: DateTime<Utc>,

    #[serde(deserialize_with = "date_time::deserialize_utc")]
    end: DateTime<Utc>,

    zone_id: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> DateTimeRange<Utc> {
        DateTimeRange::new(self.start, self.end)
    }

    fn zone_filter(&self) -> Option<Id<model::zone::Zone>> {
        self.zone_id.as_deref().map(Id::from)
    }
}

async fn occupancy(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Query(params): Query<WindowQuery>,
) -> RouteResult<Json<OccupancyReport>> {
    let report = engine
        .analytics()
        .occupancy(params.window(), params.zone_filter().as_ref())
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })?;
    Ok(Json(report))
}

async fn breaches(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Query(params): Query<WindowQuery>,
) -> RouteResult<Json<BreachReport>> {
    let report = engine
        .analytics()
        .breach_summary(params.window(), params.zone_filter().as_ref())
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })?;
    Ok(Json(report))
}

async fn tourist_history(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Path(id): Path<String>,
    Query(params): Query<WindowQuery>,
) -> RouteResult<Json<VecResponse<BreachEvent>>> {
    let events = engine
        .analytics()
        .tourist_history(&Id::from(id.as_str()), params.window())
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })?;
    Ok(VecResponse::new(events).json())
}
