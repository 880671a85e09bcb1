use axum::{
    routing::on,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

mod alerts;
mod analytics;
mod locations;
mod zones;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .nest_service("/locations", locations::routes(state.clone()))
        .nest_service("/zones", zones::routes(state.clone()))
        .nest_service("/alerts", alerts::routes(state.clone()))
        .nest_service("/analytics", analytics::routes(state.clone()))
        .nest_service("/tourists", locations::tourist_routes(state))
        .layer(TraceLayer::new_for_http())
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}
