//! Endpoint errors.
//!
//! Every failure is reported to the client in the same request as a status
//! code and a fixed plain-text body. The `Display` output of each variant is
//! exactly that body.

use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsBrowserError {
    /// A required argument is missing.
    #[error("BAD ARGS")]
    BadArgs,

    /// The path is `/` or is not a valid absolute path.
    #[error("BAD PATH")]
    BadPath,

    /// Create was asked for a path that already exists.
    #[error("FILE EXISTS")]
    FileExists,

    /// No such file.
    #[error("FileNotFound")]
    NotFound,

    /// The filesystem refused to create or open the file for writing.
    #[error("CREATE FAILED")]
    CreateFailed,

    /// The filesystem refused to remove the file.
    #[error("DELETE FAILED")]
    DeleteFailed,

    /// Writing upload data failed part way through.
    #[error("WRITE FAILED")]
    WriteFailed,

    /// The upload body is not valid multipart data.
    #[error("BAD UPLOAD")]
    BadUpload,
}

impl FsBrowserError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            FsBrowserError::NotFound => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_body() {
        assert_eq!(FsBrowserError::BadArgs.status(), 500);
        assert_eq!(FsBrowserError::BadArgs.to_string(), "BAD ARGS");
        assert_eq!(FsBrowserError::BadPath.to_string(), "BAD PATH");
        assert_eq!(FsBrowserError::FileExists.to_string(), "FILE EXISTS");
        assert_eq!(FsBrowserError::CreateFailed.to_string(), "CREATE FAILED");

        assert_eq!(FsBrowserError::NotFound.status(), 404);
        assert_eq!(FsBrowserError::NotFound.to_string(), "FileNotFound");
    }
}
