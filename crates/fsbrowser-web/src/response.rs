//! Conversion of endpoint responses into axum responses.

use std::io::{self, Read};

use axum::{
    body::{Body as AxumBody, Bytes},
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use fsbrowser_core::{Body, Response as EndpointResponse};
use futures::stream;
use tokio::sync::mpsc;
use tracing::warn;

/// Chunk size for streamed files.
const CHUNK_SIZE: usize = 8 * 1024;

/// Chunks buffered between the reader and the connection.
const CHUNK_BACKLOG: usize = 4;

/// Write out an endpoint response.
///
/// Streamed files are read in chunks on the blocking pool and sent as they
/// are read, so a file is never held in memory whole.
pub async fn into_axum(response: EndpointResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match response.body {
        Body::Empty => AxumBody::empty(),
        Body::Text(text) => AxumBody::from(text),
        Body::Stream(reader) => stream_body(reader),
    };

    let mut out = (status, [(CONTENT_TYPE, response.content_type)], body).into_response();
    if let Some(encoding) = response.content_encoding {
        out.headers_mut()
            .insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
    }
    out
}

fn stream_body(mut reader: Box<dyn Read + Send>) -> AxumBody {
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(CHUNK_BACKLOG);

    tokio::task::spawn_blocking(move || {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let chunk = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => Ok(Bytes::copy_from_slice(&buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Streaming file failed: {}", e);
                    Err(e)
                }
            };
            let failed = chunk.is_err();
            // The client went away.
            if tx.blocking_send(chunk).is_err() || failed {
                break;
            }
        }
    });

    AxumBody::from_stream(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    }))
}
