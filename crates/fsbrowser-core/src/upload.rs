//! Streaming uploads.
//!
//! An upload goes through three events, strictly in order:
//! start (filename) → data (zero or more chunks) → end.
//! [`UploadHandler`] applies those events to the filesystem, one upload at a
//! time. Hosts that receive raw bodies wrap it in a [`MultipartUpload`];
//! hosts whose HTTP framework already splits multipart parts feed events
//! directly.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::error::FsBrowserError;
use crate::fs::FileSystem;
use crate::multipart::{MultipartEvent, MultipartParser};
use crate::path::FsPath;
use crate::service::FileService;

/// Upload lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEvent<'a> {
    /// A file part begins. The filename is used as the target path, with
    /// `/` prefixed when missing.
    Start { filename: &'a str },
    /// Next chunk of file content.
    Data(&'a [u8]),
    /// The file part is complete.
    End,
}

/// A finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    /// Where the file was written.
    pub path: FsPath,
    /// Number of bytes written.
    pub size: u64,
}

/// State of one upload: target path and open write handle.
///
/// If the file could not be opened the session stays inert: writes are
/// dropped and [`UploadSession::finish`] reports the failure.
#[derive(Debug)]
pub struct UploadSession<W> {
    path: Option<FsPath>,
    writer: Option<W>,
    written: u64,
    error: Option<FsBrowserError>,
}

impl<W: Write> UploadSession<W> {
    pub(crate) fn opened(path: FsPath, writer: W) -> Self {
        Self {
            path: Some(path),
            writer: Some(writer),
            written: 0,
            error: None,
        }
    }

    pub(crate) fn failed(path: Option<FsPath>, error: FsBrowserError) -> Self {
        Self {
            path,
            writer: None,
            written: 0,
            error: Some(error),
        }
    }

    /// Target path, if the filename was valid.
    pub fn path(&self) -> Option<&FsPath> {
        self.path.as_ref()
    }

    /// True while a write handle is held.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Append a chunk. No-op if the file is not open.
    pub fn write(&mut self, chunk: &[u8]) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write_all(chunk) {
            Ok(()) => self.written += chunk.len() as u64,
            Err(e) => {
                warn!(
                    "Upload write to {} failed after {} bytes: {}",
                    self.path.as_ref().map(FsPath::as_str).unwrap_or("?"),
                    self.written,
                    e
                );
                self.writer = None;
                self.error = Some(FsBrowserError::WriteFailed);
            }
        }
    }

    /// Close the file and report the outcome.
    pub fn finish(mut self) -> Result<UploadSummary, FsBrowserError> {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!("Upload flush failed: {}", e);
                return Err(FsBrowserError::WriteFailed);
            }
        }
        if let Some(error) = self.error {
            return Err(error);
        }
        let path = self.path.ok_or(FsBrowserError::CreateFailed)?;
        Ok(UploadSummary {
            path,
            size: self.written,
        })
    }
}

/// Applies upload events for one request.
pub struct UploadHandler<'s, F: FileSystem> {
    service: &'s FileService<F>,
    session: Option<UploadSession<F::Writer>>,
    completed: Vec<UploadSummary>,
    error: Option<FsBrowserError>,
}

impl<'s, F: FileSystem> UploadHandler<'s, F> {
    /// Create a handler writing through `service`.
    pub fn new(service: &'s FileService<F>) -> Self {
        Self {
            service,
            session: None,
            completed: Vec::new(),
            error: None,
        }
    }

    /// Apply one lifecycle event.
    pub fn handle(&mut self, event: UploadEvent<'_>) {
        match event {
            UploadEvent::Start { filename } => {
                if let Some(previous) = self.session.take() {
                    debug!("Upload started before the previous one ended");
                    self.record(previous.finish());
                }
                self.session = Some(self.service.begin_upload(filename));
            }
            UploadEvent::Data(chunk) => {
                if let Some(session) = self.session.as_mut() {
                    session.write(chunk);
                }
            }
            UploadEvent::End => {
                if let Some(session) = self.session.take() {
                    self.record(session.finish());
                }
            }
        }
    }

    fn record(&mut self, result: Result<UploadSummary, FsBrowserError>) {
        match result {
            Ok(summary) => {
                info!("Upload {} complete, {} bytes", summary.path, summary.size);
                self.completed.push(summary);
            }
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
    }

    /// End of request: close any open upload and report the outcome.
    ///
    /// The first failure wins; uploads that completed before it stay on
    /// the filesystem.
    pub fn finish(mut self) -> Result<Vec<UploadSummary>, FsBrowserError> {
        if let Some(session) = self.session.take() {
            self.record(session.finish());
        }
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.completed),
        }
    }
}

/// Drives an [`UploadHandler`] from a raw `multipart/form-data` body.
///
/// Only parts with a filename are uploads; plain form fields are skipped.
pub struct MultipartUpload<'s, F: FileSystem> {
    parser: MultipartParser,
    handler: UploadHandler<'s, F>,
    in_file: bool,
}

impl<'s, F: FileSystem> MultipartUpload<'s, F> {
    /// Start parsing a body with the given `Content-Type`.
    pub fn new(service: &'s FileService<F>, content_type: &str) -> Result<Self, FsBrowserError> {
        let parser = MultipartParser::from_content_type(content_type).map_err(|e| {
            warn!("Rejecting upload: {}", e);
            FsBrowserError::BadUpload
        })?;
        Ok(Self {
            parser,
            handler: UploadHandler::new(service),
            in_file: false,
        })
    }

    /// Push the next body chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), FsBrowserError> {
        let handler = &mut self.handler;
        let in_file = &mut self.in_file;

        self.parser
            .feed(chunk, |event| match event {
                MultipartEvent::PartStart(headers) => match headers.filename.as_deref() {
                    Some(filename) => {
                        *in_file = true;
                        handler.handle(UploadEvent::Start { filename });
                    }
                    None => *in_file = false,
                },
                MultipartEvent::PartData(bytes) => {
                    if *in_file {
                        handler.handle(UploadEvent::Data(bytes));
                    }
                }
                MultipartEvent::PartEnd => {
                    if *in_file {
                        handler.handle(UploadEvent::End);
                        *in_file = false;
                    }
                }
            })
            .map_err(|e| {
                warn!("Malformed upload body: {}", e);
                FsBrowserError::BadUpload
            })
    }

    /// End of body.
    pub fn finish(self) -> Result<Vec<UploadSummary>, FsBrowserError> {
        if let Err(e) = self.parser.finish() {
            warn!("Upload body incomplete: {}", e);
            // Closing the handler keeps whatever was written so far.
            let _ = self.handler.finish();
            return Err(FsBrowserError::BadUpload);
        }
        self.handler.finish()
    }
}
