//! Static verb + path route table.
//!
//! Every request resolves to exactly one [`Route`]. Anything that is not
//! one of the fixed endpoints falls through to [`Route::Static`], which
//! serves the request path from the filesystem.

/// HTTP methods the file browser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Other,
}

impl Method {
    /// Parse a method name (case-sensitive, as on the wire).
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => Method::Get,
            "PUT" => Method::Put,
            "POST" => Method::Post,
            "DELETE" => Method::Delete,
            _ => Method::Other,
        }
    }
}

/// Endpoint selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /list?dir=...`
    List,
    /// `GET /edit` - the editor page.
    Editor,
    /// `PUT /edit` - create an empty file.
    Create,
    /// `DELETE /edit` - remove a file.
    Delete,
    /// `POST /edit` - multipart upload.
    Upload,
    /// `GET /all` - device diagnostics.
    Status,
    /// Anything else: serve the path from the filesystem.
    Static,
}

const ROUTES: &[(Method, &str, Route)] = &[
    (Method::Get, "/list", Route::List),
    (Method::Get, "/edit", Route::Editor),
    (Method::Put, "/edit", Route::Create),
    (Method::Delete, "/edit", Route::Delete),
    (Method::Post, "/edit", Route::Upload),
    (Method::Get, "/all", Route::Status),
];

impl Route {
    /// Look up the route for a method and a path (query string ignored).
    pub fn resolve(method: Method, uri: &str) -> Self {
        let path = split_uri(uri).0;
        ROUTES
            .iter()
            .find(|(m, p, _)| *m == method && *p == path)
            .map(|(_, _, route)| *route)
            .unwrap_or(Route::Static)
    }

    /// Fixed routes as `(method, path)` pairs, for hosts that register
    /// handlers one by one.
    pub fn table() -> impl Iterator<Item = (Method, &'static str, Route)> {
        ROUTES.iter().copied()
    }
}

/// Split a request URI into path and optional query string.
pub fn split_uri(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}
