//! File browser endpoints.
//!
//! [`FileService`] implements every endpoint against an injected
//! [`FileSystem`] and [`DeviceProbe`]. It knows nothing about sockets:
//! hosts parse the request into a method, a URI and [`RequestArgs`], call
//! [`FileService::handle`], and write out the returned [`Response`].
//!
//! Uploads are the exception, since their body is streamed: hosts drive an
//! [`UploadHandler`](crate::upload::UploadHandler) (or a
//! [`MultipartUpload`](crate::upload::MultipartUpload)) to completion
//! first, then acknowledge.

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::args::RequestArgs;
use crate::config::{BrowserConfig, ConfigError};
use crate::error::FsBrowserError;
use crate::fs::{FileSystem, FsEntry};
use crate::mime::{self, OCTET_STREAM, X_GZIP};
use crate::model::{DeviceStatus, DirectoryEntry};
use crate::path::FsPath;
use crate::probe::{DeviceProbe, NullProbe};
use crate::response::Response;
use crate::route::{split_uri, Method, Route};
use crate::upload::UploadSession;

/// Argument that forces `application/octet-stream`.
const DOWNLOAD_ARG: &str = "download";

/// Argument naming the directory to list.
const DIR_ARG: &str = "dir";

/// An opened file ready to be streamed.
#[derive(Debug)]
pub struct StaticFile<R> {
    /// The path actually opened (may be the `.gz` variant).
    pub path: FsPath,
    /// Content type computed for the requested path.
    pub content_type: &'static str,
    /// True when the `.gz` variant was chosen.
    pub gzip: bool,
    /// Open read handle; dropping it closes the file.
    pub reader: R,
}

impl<R> StaticFile<R> {
    /// `Content-Encoding` to send, if any.
    ///
    /// A gzip variant is announced as such unless the client asked for the
    /// archive itself.
    pub fn content_encoding(&self) -> Option<&'static str> {
        if self.gzip && self.content_type != X_GZIP && self.content_type != OCTET_STREAM {
            Some("gzip")
        } else {
            None
        }
    }
}

impl<R: std::io::Read + Send + 'static> From<StaticFile<R>> for Response {
    fn from(file: StaticFile<R>) -> Self {
        let encoding = file.content_encoding();
        Response::stream(file.content_type, encoding, file.reader)
    }
}

/// The file browser endpoints.
pub struct FileService<F: FileSystem> {
    fs: F,
    probe: Box<dyn DeviceProbe>,
    editor_page: FsPath,
    index_page: String,
}

impl<F: FileSystem> FileService<F> {
    /// Create a service with default pages and a [`NullProbe`].
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            probe: Box::new(NullProbe),
            editor_page: FsPath::root().with_suffix("edit.htm"),
            index_page: "index.htm".to_string(),
        }
    }

    /// Create a service with the pages from `config`.
    pub fn from_config(fs: F, config: &BrowserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            editor_page: config.editor_path()?,
            index_page: config.index_page.clone(),
            ..Self::new(fs)
        })
    }

    /// Replace the device probe.
    pub fn with_probe(mut self, probe: impl DeviceProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// The underlying filesystem.
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Dispatch a request.
    ///
    /// `uri` is the request target including any query string. For
    /// [`Route::Upload`] this only produces the acknowledgment.
    pub fn handle(&self, method: Method, uri: &str, args: &RequestArgs) -> Response {
        let download = args.has(DOWNLOAD_ARG);
        let route = Route::resolve(method, uri);
        debug!("{:?} {} -> {:?}", method, uri, route);

        let result = match route {
            Route::List => self.list(args).map(|entries| Response::json(&entries)),
            Route::Editor => self.editor(download).map(Response::from),
            Route::Create => self.create(args).map(|()| Response::empty()),
            Route::Delete => self.delete(args).map(|()| Response::empty()),
            Route::Upload => Ok(Response::empty()),
            Route::Status => Ok(Response::json(&self.status())),
            Route::Static => self
                .read_request_path(split_uri(uri).0, download)
                .map(Response::from),
        };

        result.unwrap_or_else(Response::from)
    }

    /// `GET /list?dir=<path>`: immediate entries of `dir`.
    pub fn list(&self, args: &RequestArgs) -> Result<Vec<DirectoryEntry>, FsBrowserError> {
        let dir = args.get(DIR_ARG).ok_or(FsBrowserError::BadArgs)?;
        let dir = FsPath::new(dir).map_err(|e| {
            debug!("list: {}", e);
            FsBrowserError::BadPath
        })?;
        debug!("handleFileList: {}", dir);

        let entries = self.fs.read_dir(&dir).map_err(|e| {
            warn!("Listing {} failed: {}", dir, e);
            FsBrowserError::BadPath
        })?;

        Ok(entries
            .iter()
            .filter_map(|entry| directory_entry(entry, &dir))
            .collect())
    }

    /// Read a file for streaming, preferring a `.gz` variant.
    ///
    /// A path ending in `/` gets the index page appended.
    pub fn read(&self, path: &str, download: bool) -> Result<StaticFile<F::Reader>, FsBrowserError> {
        let mut path = FsPath::new(path).map_err(|e| {
            debug!("read: {}", e);
            FsBrowserError::NotFound
        })?;
        if path.is_dir_marker() {
            path = path.with_suffix(&self.index_page);
        }
        debug!("handleFileRead: {}", path);

        let content_type = mime::content_type(path.as_str(), download);
        let gz = path.with_suffix(".gz");
        let (path, gzip) = if self.fs.exists(&gz) {
            (gz, true)
        } else if self.fs.exists(&path) {
            (path, false)
        } else {
            return Err(FsBrowserError::NotFound);
        };

        let reader = self.fs.open(&path).map_err(|e| {
            warn!("Opening {} failed: {}", path, e);
            FsBrowserError::NotFound
        })?;

        Ok(StaticFile {
            path,
            content_type,
            gzip,
            reader,
        })
    }

    /// Read the file named by a request path, still percent-encoded as it
    /// arrived on the wire.
    ///
    /// Paths that do not decode to UTF-8 are not found.
    pub fn read_request_path(
        &self,
        uri_path: &str,
        download: bool,
    ) -> Result<StaticFile<F::Reader>, FsBrowserError> {
        let path = percent_decode_str(uri_path).decode_utf8().map_err(|e| {
            debug!("read: {}: {}", uri_path, e);
            FsBrowserError::NotFound
        })?;
        self.read(&path, download)
    }

    /// `GET /edit`: the editor page.
    pub fn editor(&self, download: bool) -> Result<StaticFile<F::Reader>, FsBrowserError> {
        self.read(self.editor_page.as_str(), download)
    }

    /// `PUT /edit`: create an empty file at arg0.
    pub fn create(&self, args: &RequestArgs) -> Result<(), FsBrowserError> {
        let path = target_path(args)?;
        debug!("handleFileCreate: {}", path);

        if self.fs.exists(&path) {
            return Err(FsBrowserError::FileExists);
        }
        let file = self.fs.create(&path).map_err(|e| {
            warn!("Creating {} failed: {}", path, e);
            FsBrowserError::CreateFailed
        })?;
        drop(file);
        Ok(())
    }

    /// `DELETE /edit`: remove the file at arg0.
    pub fn delete(&self, args: &RequestArgs) -> Result<(), FsBrowserError> {
        let path = target_path(args)?;
        debug!("handleFileDelete: {}", path);

        if !self.fs.exists(&path) {
            return Err(FsBrowserError::NotFound);
        }
        self.fs.remove(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FsBrowserError::NotFound
            } else {
                warn!("Deleting {} failed: {}", path, e);
                FsBrowserError::DeleteFailed
            }
        })
    }

    /// Upload start: open (truncating) the file named by `filename`.
    ///
    /// Never fails outright; a session that could not open its file
    /// swallows data and reports the failure when finished.
    pub fn begin_upload(&self, filename: &str) -> UploadSession<F::Writer> {
        let path = match FsPath::from_upload_name(filename) {
            Ok(path) if !path.is_root() && !path.is_dir_marker() => path,
            Ok(path) => {
                warn!("Upload rejected, not a file name: {}", path);
                return UploadSession::failed(Some(path), FsBrowserError::CreateFailed);
            }
            Err(e) => {
                warn!("Upload rejected: {}", e);
                return UploadSession::failed(None, FsBrowserError::CreateFailed);
            }
        };
        debug!("handleFileUpload Name: {}", path);

        match self.fs.create(&path) {
            Ok(writer) => UploadSession::opened(path, writer),
            Err(e) => {
                warn!("Opening {} for upload failed: {}", path, e);
                UploadSession::failed(Some(path), FsBrowserError::CreateFailed)
            }
        }
    }

    /// `GET /all`: a live device reading.
    pub fn status(&self) -> DeviceStatus {
        self.probe.status()
    }
}

/// arg0 as a create/delete target. `/` and other paths ending in `/` are
/// never valid targets.
fn target_path(args: &RequestArgs) -> Result<FsPath, FsBrowserError> {
    let raw = args.first().ok_or(FsBrowserError::BadArgs)?;
    match FsPath::new(raw) {
        Ok(path) if !path.is_dir_marker() => Ok(path),
        Ok(_) => Err(FsBrowserError::BadPath),
        Err(e) => {
            debug!("target path: {}", e);
            Err(FsBrowserError::BadPath)
        }
    }
}

fn directory_entry(entry: &FsEntry, dir: &FsPath) -> Option<DirectoryEntry> {
    let name = entry.path.relative_to(dir)?;
    Some(DirectoryEntry {
        kind: entry.kind,
        name: name.to_string(),
    })
}
