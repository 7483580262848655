//! Framework-agnostic responses.
//!
//! Handlers produce a [`Response`]; each host (axum on Linux, esp-idf-svc
//! on ESP32) writes it out with its own primitives.

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::FsBrowserError;
use crate::mime::{TEXT_JSON, TEXT_PLAIN};

/// Response payload.
pub enum Body {
    /// No body.
    Empty,
    /// Text or JSON body.
    Text(String),
    /// File contents, streamed by the host. The handle is closed when the
    /// reader is dropped.
    Stream(Box<dyn Read + Send>),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => write!(f, "Empty"),
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// HTTP response produced by the endpoints.
#[derive(Debug)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// `Content-Encoding` header value, if any.
    pub content_encoding: Option<&'static str>,
    /// Payload.
    pub body: Body,
}

impl Response {
    /// `200` with an empty `text/plain` body.
    pub fn empty() -> Self {
        Self::text(200, "")
    }

    /// A `text/plain` response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN,
            content_encoding: None,
            body: Body::Text(body.into()),
        }
    }

    /// A `200` `text/json` response.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => Self {
                status: 200,
                content_type: TEXT_JSON,
                content_encoding: None,
                body: Body::Text(json),
            },
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                Self::text(500, e.to_string())
            }
        }
    }

    /// A streamed file.
    pub fn stream(
        content_type: &'static str,
        content_encoding: Option<&'static str>,
        reader: impl Read + Send + 'static,
    ) -> Self {
        Self {
            status: 200,
            content_type,
            content_encoding,
            body: Body::Stream(Box::new(reader)),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consume the response and read the whole body into memory.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        match self.body {
            Body::Empty => Ok(Vec::new()),
            Body::Text(text) => Ok(text.into_bytes()),
            Body::Stream(mut reader) => {
                let mut out = Vec::new();
                reader.read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

impl From<FsBrowserError> for Response {
    fn from(error: FsBrowserError) -> Self {
        Self::text(error.status(), error.to_string())
    }
}
