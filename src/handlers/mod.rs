pub mod api;
pub mod graphs;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Row source
        .route("/graphs/input.csv", get(graphs::input).post(graphs::upload))
        // API (JSON for charts)
        .route("/api/graphs/segment", get(api::segment))
        .route("/api/graphs/series", get(api::series))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
