//! Resource routes. Every path answers with and without the trailing slash.

use crate::handlers::{self, Ingredients, Recipes, Resource, Restaurants};
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::{json, Value};

const INGREDIENTI: &str = "/ingredienti";
const RICETTE: &str = "/ricette";
const RISTORANTI: &str = "/ristoranti";

fn route_both(router: Router<AppState>, path: &str, method_router: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, method_router.clone())
        .route(&format!("{}/", path), method_router)
}

/// Links to the three collections.
async fn api_root(State(state): State<AppState>) -> Json<Value> {
    let p = &state.api_prefix;
    Json(json!({
        "ristoranti": format!("{}{}/", p, RISTORANTI),
        "ricette": format!("{}{}/", p, RICETTE),
        "ingredienti": format!("{}{}/", p, INGREDIENTI),
    }))
}

/// Collection and item routes for one resource.
fn mount<R: Resource>(router: Router<AppState>, path: &str) -> Router<AppState> {
    let router = route_both(router, path, get(handlers::list::<R>).post(handlers::create::<R>));
    route_both(
        router,
        &format!("{}/:nome", path),
        get(handlers::retrieve::<R>)
            .put(handlers::update::<R>)
            .patch(handlers::partial_update::<R>)
            .delete(handlers::destroy::<R>),
    )
}

/// The API root alone, at an absolute path. Used for the prefixed root, which `nest` does not
/// serve with a trailing slash.
pub fn root_route(path: &str, state: AppState) -> Router {
    Router::new().route(path, get(api_root)).with_state(state)
}

pub fn resource_routes(state: AppState) -> Router {
    let mut router = Router::new().route("/", get(api_root));
    router = mount::<Ingredients>(router, INGREDIENTI);
    router = mount::<Recipes>(router, RICETTE);
    router = mount::<Restaurants>(router, RISTORANTI);
    router.with_state(state)
}
