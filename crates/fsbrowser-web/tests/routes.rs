//! Route tests for the file browser.
//!
//! Each test builds a router over an in-memory filesystem and drives it
//! with single requests.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use fsbrowser_core::{DeviceStatus, FileService, MemoryFs};
use fsbrowser_web::{app_state, create_router};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

fn router() -> (MemoryFs, Router) {
    let fs = MemoryFs::new();
    let service = FileService::new(fs.clone()).with_probe(|| DeviceStatus {
        heap: 32768,
        analog: 1023,
        gpio: 5,
    });
    (fs, create_router(app_state(service)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(filename: &str, contents: &str) -> Request<Body> {
    let body = format!(
        "--XyZ\r\n\
Content-Disposition: form-data; name=\"data\"; filename=\"{}\"\r\n\
Content-Type: application/octet-stream\r\n\r\n\
{}\r\n--XyZ--\r\n",
        filename, contents
    );
    Request::builder()
        .method("POST")
        .uri("/edit")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XyZ")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_list_requires_dir() {
    let (_fs, app) = router();
    let (status, content_type, body) = send(&app, request("GET", "/list")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body, b"BAD ARGS");
}

#[tokio::test]
async fn test_list_root() {
    let (fs, app) = router();
    fs.insert("/edit.htm", b"<html>");
    fs.insert("/img/logo.png", b"png");

    let (status, content_type, body) = send(&app, request("GET", "/list?dir=/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/json"));
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"[{"type":"file","name":"edit.htm"},{"type":"dir","name":"img"}]"#
    );
}

#[tokio::test]
async fn test_create_upload_read_delete() {
    let (fs, app) = router();

    assert_eq!(send(&app, request("GET", "/notes.txt")).await.0, StatusCode::NOT_FOUND);

    let (status, _, body) = send(&app, request("PUT", "/edit?path=/notes.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, _, _) = send(&app, multipart("notes.txt", "line one\nline two")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fs.contents("/notes.txt").unwrap(), b"line one\nline two");

    let (status, content_type, body) = send(&app, request("GET", "/notes.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body, b"line one\nline two");

    assert_eq!(send(&app, request("DELETE", "/edit?path=/notes.txt")).await.0, StatusCode::OK);
    let (status, _, body) = send(&app, request("DELETE", "/edit?path=/notes.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"FileNotFound");
}

#[tokio::test]
async fn test_form_body_arguments() {
    let (fs, app) = router();

    let (status, _, _) = send(&app, form("PUT", "/edit", "path=%2Fnew%20file.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fs.contents("/new file.txt").unwrap(), b"");

    let (status, _, body) = send(&app, form("PUT", "/edit", "path=%2Fnew%20file.txt")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"FILE EXISTS");

    let (status, _, _) = send(&app, form("DELETE", "/edit", "path=/new+file.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(fs.is_empty());
}

#[tokio::test]
async fn test_create_errors() {
    let (fs, app) = router();
    let (status, _, body) = send(&app, request("PUT", "/edit")).await;
    assert_eq!((status, body), (StatusCode::INTERNAL_SERVER_ERROR, b"BAD ARGS".to_vec()));

    let (status, _, body) = send(&app, request("PUT", "/edit?path=/")).await;
    assert_eq!((status, body), (StatusCode::INTERNAL_SERVER_ERROR, b"BAD PATH".to_vec()));

    let (_, _, body) = send(&app, request("PUT", "/edit?path=/../escape")).await;
    assert_eq!(body, b"BAD PATH");
    assert!(fs.is_empty());
}

#[tokio::test]
async fn test_gzip_variant_served_with_encoding() {
    let (fs, app) = router();
    fs.insert("/edit.htm", b"plain editor");
    fs.insert("/edit.htm.gz", b"gzipped editor");

    let response = app.clone().oneshot(request("GET", "/edit")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"gzipped editor");
}

#[tokio::test]
async fn test_download_flag() {
    let (fs, app) = router();
    fs.insert("/index.htm", b"<h1>hi</h1>");

    let (_, content_type, _) = send(&app, request("GET", "/")).await;
    assert_eq!(content_type.as_deref(), Some("text/html"));

    let (status, content_type, body) = send(&app, request("GET", "/index.htm?download=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(body, b"<h1>hi</h1>");
}

#[tokio::test]
async fn test_status_endpoint() {
    let (_fs, app) = router();
    let (status, content_type, body) = send(&app, request("GET", "/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/json"));
    assert_eq!(body, br#"{"heap":32768,"analog":1023,"gpio":5}"#);
}

#[tokio::test]
async fn test_unmatched_method_falls_back_to_static() {
    let (fs, app) = router();
    fs.insert("/all", b"a file called all");

    let (status, _, body) = send(&app, request("POST", "/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"a file called all");

    let (status, _, body) = send(&app, request("POST", "/list")).await;
    assert_eq!((status, body), (StatusCode::NOT_FOUND, b"FileNotFound".to_vec()));
}

#[tokio::test]
async fn test_upload_rejects_non_multipart() {
    let (fs, app) = router();
    let (status, _, body) = send(&app, form("POST", "/edit", "data=x")).await;
    assert_eq!((status, body), (StatusCode::INTERNAL_SERVER_ERROR, b"BAD UPLOAD".to_vec()));
    assert!(fs.is_empty());
}

#[tokio::test]
async fn test_upload_invalid_name_reports_create_failed() {
    let (fs, app) = router();
    let (status, _, body) = send(&app, multipart("../outside.txt", "data")).await;
    assert_eq!((status, body), (StatusCode::INTERNAL_SERVER_ERROR, b"CREATE FAILED".to_vec()));
    assert!(fs.is_empty());
}

#[tokio::test]
async fn test_percent_encoded_path_reads_uploaded_file() {
    let (fs, app) = router();

    let (status, _, _) = send(&app, multipart("my notes.txt", "spaced out")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fs.contents("/my notes.txt").unwrap(), b"spaced out");

    let (status, content_type, body) = send(&app, request("GET", "/my%20notes.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body, b"spaced out");

    let (status, _, body) = send(&app, request("GET", "/%FF%FE.txt")).await;
    assert_eq!((status, body), (StatusCode::NOT_FOUND, b"FileNotFound".to_vec()));
}

#[tokio::test]
async fn test_large_file_streams_in_full() {
    let (fs, app) = router();
    let contents: Vec<u8> = (0..100 * 1024).map(|i| (i % 251) as u8).collect();
    fs.insert("/firmware.bin", &contents);

    let (status, content_type, body) = send(&app, request("GET", "/firmware.bin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body.len(), contents.len());
    assert_eq!(body, contents);
}
