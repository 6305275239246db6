pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluations::handlers as evaluations;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/parse-jd", post(matching::handle_parse_jd))
        .route("/api/v1/evaluate/text", post(matching::handle_evaluate_text))
        .route("/api/v1/evaluate", post(matching::handle_evaluate_files))
        .route("/api/v1/rank", post(matching::handle_rank))
        // Evaluation history and reports
        .route(
            "/api/v1/evaluations",
            get(evaluations::handle_list_evaluations).post(evaluations::handle_save_evaluation),
        )
        .route("/api/v1/evaluations/:id", get(evaluations::handle_get_evaluation))
        .route("/api/v1/reports", post(evaluations::handle_report))
        .layer(body_limit)
        .with_state(state)
}
