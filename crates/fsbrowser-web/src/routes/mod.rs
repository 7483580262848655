//! HTTP route handlers for the file browser.
//!
//! # Endpoints
//!
//! ### `GET /list?dir=<path>`
//! JSON array of `{"type","name"}` for the immediate entries of `dir`.
//!
//! ### `GET /edit`
//! The editor page (gzip variant preferred).
//!
//! ### `PUT /edit`
//! Create an empty file at the first argument.
//!
//! ### `DELETE /edit`
//! Delete the file at the first argument.
//!
//! ### `POST /edit`
//! Multipart upload; each file part is written to its filename.
//!
//! ### `GET /all`
//! Live heap, analog and GPIO readings.
//!
//! Any other method or path serves the request path from the filesystem,
//! or answers `404 FileNotFound`.

pub mod files;
pub mod status;
pub mod upload;

use axum::{
    http::{header::CONTENT_TYPE, HeaderMap},
    routing::get,
    Router,
};
use fsbrowser_core::{FileSystem, RequestArgs};
use tracing::warn;

use crate::AppState;

/// Create the router with all routes.
pub fn create_router<F: FileSystem + 'static>(state: AppState<F>) -> Router {
    Router::new()
        .route(
            "/list",
            get(files::list::<F>).fallback(files::static_file::<F>),
        )
        .route(
            "/edit",
            get(files::editor::<F>)
                .put(files::create::<F>)
                .delete(files::delete::<F>)
                .post(upload::upload::<F>)
                .fallback(files::static_file::<F>),
        )
        .route(
            "/all",
            get(status::status::<F>).fallback(files::static_file::<F>),
        )
        .fallback(files::static_file::<F>)
        .with_state(state)
}

/// Query-string arguments.
pub(crate) fn query_args(query: Option<&str>) -> RequestArgs {
    query.map(RequestArgs::from_query).unwrap_or_default()
}

/// Query-string arguments followed by form fields from the body.
pub(crate) fn request_args(query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> RequestArgs {
    let mut args = query_args(query);
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if let Err(e) = args.extend_from_body(content_type, body) {
        warn!("Ignoring malformed form body: {}", e);
    }
    args
}
