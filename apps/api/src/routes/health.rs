use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the active text encoder.
/// `encoder.kind` is "lexical" when soft scores only measure word overlap.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let kind = if state.semantic.encoder_is_lexical() {
        "lexical"
    } else {
        "sentence-embedding"
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "relevance-api",
        "encoder": {
            "backend": state.semantic.encoder_name(),
            "kind": kind
        },
        "skill_vocabulary_size": state.vocabulary.len()
    }))
}
