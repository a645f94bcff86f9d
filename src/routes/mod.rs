//! Router assembly.

mod common;
mod resources;

pub use common::common_routes;
pub use resources::{resource_routes, root_route};

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application: common routes at the root, resources under `state.api_prefix`.
pub fn app(state: AppState, body_limit: usize) -> Router {
    let resources = resource_routes(state.clone());
    let resources = if state.api_prefix.is_empty() {
        resources
    } else {
        Router::new()
            .nest(&state.api_prefix, resources)
            .merge(root_route(&format!("{}/", state.api_prefix), state.clone()))
    };
    Router::new()
        .merge(common_routes(state))
        .merge(resources)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
}
