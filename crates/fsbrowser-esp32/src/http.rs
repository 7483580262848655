//! File browser handlers on the ESP-IDF HTTP server.
//!
//! One wildcard handler per method feeds every request to the shared
//! [`FileService`]; the core route table picks the endpoint. Upload bodies
//! are parsed as they arrive with [`MultipartUpload`], so a file never has
//! to fit in RAM.

use std::io::Read as _;
use std::sync::Arc;

use anyhow::Result;
use embedded_svc::http::Method as HttpMethod;
use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use esp_idf_svc::io::{Read, Write};
use fsbrowser_core::{
    route::split_uri, Body, FileService, FileSystem, FsBrowserError, Method, MultipartUpload,
    RequestArgs, Response, Route,
};
use log::{info, warn};

/// Chunk size for reading request bodies and streaming files.
const CHUNK_SIZE: usize = 1024;

/// Largest form body read for PUT/DELETE arguments.
const MAX_FORM_BODY: usize = 4096;

const METHODS: [(HttpMethod, Method); 4] = [
    (HttpMethod::Get, Method::Get),
    (HttpMethod::Put, Method::Put),
    (HttpMethod::Post, Method::Post),
    (HttpMethod::Delete, Method::Delete),
];

/// Start the HTTP server and register the file browser on every path.
///
/// The returned server must be kept alive.
pub fn start_server<F>(service: FileService<F>, port: u16) -> Result<EspHttpServer<'static>>
where
    F: FileSystem + 'static,
{
    let config = Configuration {
        http_port: port,
        uri_match_wildcard: true,
        stack_size: 10240,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&config)?;
    let service = Arc::new(service);

    for (http_method, method) in METHODS {
        let service = Arc::clone(&service);
        server.fn_handler("/*", http_method, move |req| handle(&service, method, req))?;
    }

    info!("HTTP server started on port {}", port);
    Ok(server)
}

fn handle<F: FileSystem>(
    service: &FileService<F>,
    method: Method,
    mut req: Request<&mut EspHttpConnection>,
) -> Result<()> {
    let uri = req.uri().to_string();
    let content_type = req.header("Content-Type").map(str::to_owned);

    let response = if Route::resolve(method, &uri) == Route::Upload {
        receive_upload(service, &mut req, content_type.as_deref())?
    } else {
        let mut args = RequestArgs::from_query(split_uri(&uri).1.unwrap_or(""));
        let body = read_form_body(&mut req)?;
        if let Err(e) = args.extend_from_body(content_type.as_deref(), &body) {
            warn!("Ignoring malformed form body: {}", e);
        }
        service.handle(method, &uri, &args)
    };

    write_response(req, response)
}

fn receive_upload<F: FileSystem>(
    service: &FileService<F>,
    req: &mut Request<&mut EspHttpConnection>,
    content_type: Option<&str>,
) -> Result<Response> {
    let Some(content_type) = content_type else {
        return Ok(FsBrowserError::BadUpload.into());
    };
    let mut upload = match MultipartUpload::new(service, content_type) {
        Ok(upload) => upload,
        Err(e) => return Ok(e.into()),
    };

    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = req.read(&mut buf)?;
        if n == 0 {
            break;
        }
        if let Err(e) = upload.feed(&buf[..n]) {
            return Ok(e.into());
        }
    }

    Ok(match upload.finish() {
        Ok(done) => {
            for summary in &done {
                info!("Stored {} ({} bytes)", summary.path, summary.size);
            }
            Response::empty()
        }
        Err(e) => e.into(),
    })
}

fn read_form_body(req: &mut Request<&mut EspHttpConnection>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut buf = [0u8; CHUNK_SIZE];
    while body.len() < MAX_FORM_BODY {
        let n = req.read(&mut buf)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(MAX_FORM_BODY);
    Ok(body)
}

fn write_response(req: Request<&mut EspHttpConnection>, response: Response) -> Result<()> {
    let mut headers = vec![("Content-Type", response.content_type)];
    if let Some(encoding) = response.content_encoding {
        headers.push(("Content-Encoding", encoding));
    }
    let mut out = req.into_response(response.status, None, &headers)?;

    match response.body {
        Body::Empty => {}
        Body::Text(text) => out.write_all(text.as_bytes())?,
        Body::Stream(mut reader) => {
            let mut buf = [0u8; CHUNK_SIZE];
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n])?;
            }
        }
    }
    Ok(())
}
