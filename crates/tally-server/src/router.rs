//! Axum router wiring.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, cors, routes};

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(routes::root))
        .route("/visits", get(routes::visits));

    if state.cfg().server.cors {
        router = router.layer(middleware::from_fn(cors::permissive_cors));
    }

    router.with_state(state)
}
