//! # fsbrowser-core
//!
//! File browser endpoints for a flash-backed filesystem.
//!
//! This crate provides:
//! - Path validation and content type lookup
//! - Request argument parsing (query string and form bodies)
//! - A streaming multipart parser
//! - The filesystem capability trait with in-memory and host backends
//! - Upload sessions
//! - The endpoint service and its static route table
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on both Linux (tokio) and ESP32 (esp-idf) targets.

pub mod args;
pub mod config;
pub mod error;
pub mod fs;
pub mod mime;
pub mod model;
pub mod multipart;
pub mod path;
pub mod probe;
pub mod response;
pub mod route;
pub mod service;
pub mod upload;

pub use args::RequestArgs;
pub use config::{BrowserConfig, ConfigError};
pub use error::FsBrowserError;
pub use fs::{EntryKind, FileSystem, FsEntry, HostFs, MemoryFs};
pub use model::{DeviceStatus, DirectoryEntry};
pub use path::{FsPath, PathError};
pub use probe::{DeviceProbe, NullProbe};
pub use response::{Body, Response};
pub use route::{Method, Route};
pub use service::{FileService, StaticFile};
pub use upload::{MultipartUpload, UploadEvent, UploadHandler, UploadSession, UploadSummary};
