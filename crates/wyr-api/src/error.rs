use axum::http::StatusCode;
use tracing::{error, info};

use wyr_db::StoreError;

/// Map a store failure onto the HTTP status the adapter sees.
pub fn store_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::InvalidTransition { .. } | StoreError::DuplicateVote { .. } => {
            info!("Rejected request: {}", err);
            StatusCode::CONFLICT
        }
        other => {
            error!("Store error: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Run a blocking store call off the async runtime.
pub async fn run_blocking<F, T>(f: F) -> Result<T, StatusCode>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(store_status)
}
