//! # fsbrowser-web
//!
//! axum binding for the file browser endpoints.
//!
//! ## Architecture
//!
//! Every route delegates to [`FileService`] from `fsbrowser-core`; this
//! crate only extracts request data and writes responses:
//!
//! - `/list`, `/edit`, `/all` - fixed endpoints
//! - everything else - static files from the filesystem
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fsbrowser_core::{FileService, HostFs};
//! use fsbrowser_web::{app_state, create_router};
//!
//! let service = FileService::new(HostFs::new("data"));
//! let app = create_router(app_state(service));
//!
//! let listener = TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod response;
pub mod routes;

// Re-exports
pub use routes::create_router;

use std::sync::Arc;

use fsbrowser_core::{FileService, FileSystem};
use tokio::sync::Mutex;

/// Shared state for all route handlers.
///
/// The mutex serializes requests: one request is handled to completion
/// before the next touches the filesystem.
pub type AppState<F> = Arc<Mutex<FileService<F>>>;

/// Wrap a service for use as router state.
pub fn app_state<F: FileSystem>(service: FileService<F>) -> AppState<F> {
    Arc::new(Mutex::new(service))
}
