use sqlx::PgPool;

use crate::config::Config;
use crate::documents::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Uploaded documents, stored on disk under their document id.
    pub files: FileStore,
}
