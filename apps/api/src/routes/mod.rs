pub mod health;
pub mod parse;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // The body limit sits above the configured file cap so an oversized
    // upload reaches the handler and gets the taxonomy error envelope
    // instead of a bare 413 from the extractor.
    let body_limit = state.config.max_file_size.saturating_mul(2);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resume/parse", post(parse::handle_parse))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
