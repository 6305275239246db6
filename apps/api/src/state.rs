use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::matching::semantic::SemanticMatcher;
use crate::matching::skills::SkillVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Wraps the process-wide encoder, built once in `main`.
    pub semantic: SemanticMatcher,
    pub vocabulary: Arc<SkillVocabulary>,
}
