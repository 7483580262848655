//! Device diagnostics.

use axum::{extract::State, response::Response};
use fsbrowser_core::{FileSystem, Response as EndpointResponse};

use crate::response::into_axum;
use crate::AppState;

/// GET /all
pub async fn status<F: FileSystem + 'static>(State(state): State<AppState<F>>) -> Response {
    let reading = state.lock().await.status();
    into_axum(EndpointResponse::json(&reading)).await
}
