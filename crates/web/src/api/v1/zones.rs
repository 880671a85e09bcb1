use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::Method,
    routing::{get, on, post},
    Json, Router,
};
use model::{
    zone::{Zone, ZoneKind},
    WithId,
};
use serde::Deserialize;
use utility::id::Id;

use crate::{
    common::{
        route_not_found, schema, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", post(create).get(list))
        .route("/schema", get(schema::<Zone>))
        .route("/:id", get(get_zone).delete(deactivate))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateZoneDto {
    id: Id<Zone>,
    #[serde(flatten)]
    zone: Zone,
}

async fn create(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Json(dto): Json<CreateZoneDto>,
) -> RouteResult<Json<WithId<Zone>>> {
    let created = engine
        .registry()
        .create(dto.id, dto.zone)
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListZonesQuery {
    kind: Option<ZoneKind>,
    #[serde(default)]
    include_inactive: bool,
}

async fn list(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Query(params): Query<ListZonesQuery>,
) -> RouteResult<Json<VecResponse<WithId<Zone>>>> {
    let zones = engine
        .registry()
        .list(params.kind, params.include_inactive)
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })?;
    Ok(VecResponse::new(zones).json())
}

async fn get_zone(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Path(id): Path<String>,
) -> RouteResult<Json<WithId<Zone>>> {
    let zone = engine
        .registry()
        .get(&Id::from(id.as_str()))
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })?;
    Ok(Json(zone))
}

/// Deactivation keeps the zone for audit; it only stops matching.
async fn deactivate(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { engine }): State<WebState>,
    Path(id): Path<String>,
) -> RouteResult<Json<WithId<Zone>>> {
    let zone = engine
        .registry()
        .deactivate(&Id::from(id.as_str()))
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })?;
    Ok(Json(zone))
}
