pub mod auth;
pub mod follow;
pub mod messages;
pub mod middleware;
pub mod render;
pub mod router;
pub mod timeline;

use axum::http::StatusCode;
use tracing::error;

/// Storage failures surface as a generic server error; the cause goes to
/// the log, not the client.
pub(crate) fn internal_error(err: warble_db::StorageError) -> StatusCode {
    error!("storage failure: {err}");
    StatusCode::INTERNAL_SERVER_ERROR
}
