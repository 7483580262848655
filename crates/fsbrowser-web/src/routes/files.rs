//! List, read, create and delete.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Uri},
    response::Response,
};
use fsbrowser_core::{FileSystem, Response as EndpointResponse};

use super::{query_args, request_args};
use crate::response::into_axum;
use crate::AppState;

const DOWNLOAD_ARG: &str = "download";

/// GET /list?dir=<path>
pub async fn list<F: FileSystem + 'static>(
    State(state): State<AppState<F>>,
    RawQuery(query): RawQuery,
) -> Response {
    let args = query_args(query.as_deref());
    let response = {
        let service = state.lock().await;
        match service.list(&args) {
            Ok(entries) => EndpointResponse::json(&entries),
            Err(e) => e.into(),
        }
    };
    into_axum(response).await
}

/// GET /edit
pub async fn editor<F: FileSystem + 'static>(
    State(state): State<AppState<F>>,
    RawQuery(query): RawQuery,
) -> Response {
    let download = query_args(query.as_deref()).has(DOWNLOAD_ARG);
    let response = {
        let service = state.lock().await;
        service
            .editor(download)
            .map(EndpointResponse::from)
            .unwrap_or_else(EndpointResponse::from)
    };
    into_axum(response).await
}

/// PUT /edit
pub async fn create<F: FileSystem + 'static>(
    State(state): State<AppState<F>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let args = request_args(query.as_deref(), &headers, &body);
    let response = {
        let service = state.lock().await;
        match service.create(&args) {
            Ok(()) => EndpointResponse::empty(),
            Err(e) => e.into(),
        }
    };
    into_axum(response).await
}

/// DELETE /edit
pub async fn delete<F: FileSystem + 'static>(
    State(state): State<AppState<F>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let args = request_args(query.as_deref(), &headers, &body);
    let response = {
        let service = state.lock().await;
        match service.delete(&args) {
            Ok(()) => EndpointResponse::empty(),
            Err(e) => e.into(),
        }
    };
    into_axum(response).await
}

/// Fallback: serve the request path from the filesystem.
pub async fn static_file<F: FileSystem + 'static>(
    State(state): State<AppState<F>>,
    uri: Uri,
) -> Response {
    let download = query_args(uri.query()).has(DOWNLOAD_ARG);
    let response = {
        let service = state.lock().await;
        service
            .read_request_path(uri.path(), download)
            .map(EndpointResponse::from)
            .unwrap_or_else(EndpointResponse::from)
    };
    into_axum(response).await
}
