use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;

/// Shared handles passed to every handler through axum's `State` extractor.
/// The pool is the only database entry point; nothing in the crate reaches
/// for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
