//! Multipart uploads.
//!
//! axum splits the body into fields; each file field is fed to an
//! [`UploadHandler`] as start, data chunks and end. The reply is sent once
//! the whole body has been written.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use fsbrowser_core::{
    FileService, FileSystem, FsBrowserError, Response as EndpointResponse, UploadEvent,
    UploadHandler, UploadSummary,
};
use tracing::{debug, warn};

use crate::response::into_axum;
use crate::AppState;

/// POST /edit
pub async fn upload<F: FileSystem + 'static>(
    State(state): State<AppState<F>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!("Rejecting upload: {}", e);
            return into_axum(FsBrowserError::BadUpload.into()).await;
        }
    };

    let response = {
        let service = state.lock().await;
        match receive(&service, &mut multipart).await {
            Ok(done) => {
                debug!("Upload request stored {} file(s)", done.len());
                EndpointResponse::empty()
            }
            Err(e) => e.into(),
        }
    };
    into_axum(response).await
}

async fn receive<F: FileSystem>(
    service: &FileService<F>,
    multipart: &mut Multipart,
) -> Result<Vec<UploadSummary>, FsBrowserError> {
    let mut handler = UploadHandler::new(service);

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload body: {}", e);
                let _ = handler.finish();
                return Err(FsBrowserError::BadUpload);
            }
        };
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };

        handler.handle(UploadEvent::Start {
            filename: &filename,
        });
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => handler.handle(UploadEvent::Data(&chunk)),
                Ok(None) => break,
                Err(e) => {
                    warn!("Upload of {} interrupted: {}", filename, e);
                    let _ = handler.finish();
                    return Err(FsBrowserError::BadUpload);
                }
            }
        }
        handler.handle(UploadEvent::End);
    }

    handler.finish()
}
