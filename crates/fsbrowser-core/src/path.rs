//! Filesystem paths as seen by HTTP clients.
//!
//! Paths are slash-separated absolute strings like "/css/style.css".
//! The flash filesystem on the device is flat, so a path is just a key;
//! directories only exist as shared prefixes. Validation happens once at
//! construction so filesystem backends never see a path that could escape
//! their root.

/// A validated absolute filesystem path.
///
/// Invariants:
/// - starts with `/`
/// - no `.` or `..` segments
/// - no empty interior segments (`//`)
/// - no NUL bytes
///
/// A trailing `/` is kept: it marks a directory request that the read
/// algorithm resolves to the index page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FsPath {
    raw: String,
}

impl FsPath {
    /// Parse and validate a path string.
    pub fn new(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute(path.to_string()));
        }
        if path.contains('\0') {
            return Err(PathError::NulByte);
        }

        // Skip the leading empty segment; a trailing empty segment is a
        // directory marker and is allowed.
        let inner = path[1..].strip_suffix('/').unwrap_or(&path[1..]);
        if !inner.is_empty() {
            for segment in inner.split('/') {
                match segment {
                    "" => return Err(PathError::EmptySegment(path.to_string())),
                    "." | ".." => return Err(PathError::Traversal(path.to_string())),
                    _ => {}
                }
            }
        }

        Ok(Self {
            raw: path.to_string(),
        })
    }

    /// The filesystem root, `/`.
    pub fn root() -> Self {
        Self {
            raw: "/".to_string(),
        }
    }

    /// Build a path from an upload filename, prefixing `/` when missing.
    pub fn from_upload_name(filename: &str) -> Result<Self, PathError> {
        if filename.starts_with('/') {
            Self::new(filename)
        } else {
            Self::new(&format!("/{}", filename))
        }
    }

    /// Get the raw path string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True for `/`.
    pub fn is_root(&self) -> bool {
        self.raw == "/"
    }

    /// True when the path ends with `/`.
    pub fn is_dir_marker(&self) -> bool {
        self.raw.ends_with('/')
    }

    /// The path without its leading `/`, for joining onto a host directory.
    pub fn relative(&self) -> &str {
        &self.raw[1..]
    }

    /// Append a raw suffix, e.g. `.gz` or `index.htm`.
    ///
    /// The suffix must not introduce separators, so the result keeps the
    /// invariants without re-validation.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        debug_assert!(!suffix.contains('/'));
        Self {
            raw: format!("{}{}", self.raw, suffix),
        }
    }

    /// Join a single child name onto this path.
    pub fn join(&self, name: &str) -> Result<Self, PathError> {
        if self.raw.ends_with('/') {
            Self::new(&format!("{}{}", self.raw, name))
        } else {
            Self::new(&format!("{}/{}", self.raw, name))
        }
    }

    /// Name of `self` relative to `dir`, with the leading separator stripped.
    ///
    /// Returns `None` if `self` is not below `dir`.
    pub fn relative_to(&self, dir: &FsPath) -> Option<&str> {
        let prefix = dir.raw.trim_end_matches('/');
        let rest = self.raw.strip_prefix(prefix)?;
        let rest = rest.strip_prefix('/')?;
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

impl std::fmt::Display for FsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl AsRef<str> for FsPath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// Errors that can occur when validating a path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Path must start with '/': {0}")]
    NotAbsolute(String),

    #[error("Path contains a NUL byte")]
    NulByte,

    #[error("Path contains an empty segment: {0}")]
    EmptySegment(String),

    #[error("Path contains '.' or '..': {0}")]
    Traversal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert!(FsPath::new("/").unwrap().is_root());
        assert_eq!(FsPath::new("/index.htm").unwrap().as_str(), "/index.htm");
        assert!(FsPath::new("/css/").unwrap().is_dir_marker());
        assert_eq!(FsPath::new("/a/b.txt").unwrap().relative(), "a/b.txt");
    }

    #[test]
    fn test_rejected_paths() {
        assert_eq!(FsPath::new(""), Err(PathError::Empty));
        assert!(matches!(
            FsPath::new("edit.htm"),
            Err(PathError::NotAbsolute(_))
        ));
        assert!(matches!(
            FsPath::new("/../etc/passwd"),
            Err(PathError::Traversal(_))
        ));
        assert!(matches!(FsPath::new("/a/./b"), Err(PathError::Traversal(_))));
        assert!(matches!(FsPath::new("//x"), Err(PathError::EmptySegment(_))));
        assert_eq!(FsPath::new("/a\0b"), Err(PathError::NulByte));
    }

    #[test]
    fn test_upload_name_gets_leading_slash() {
        assert_eq!(
            FsPath::from_upload_name("photo.jpg").unwrap().as_str(),
            "/photo.jpg"
        );
        assert_eq!(
            FsPath::from_upload_name("/photo.jpg").unwrap().as_str(),
            "/photo.jpg"
        );
        assert!(FsPath::from_upload_name("../photo.jpg").is_err());
    }

    #[test]
    fn test_relative_to() {
        let root = FsPath::root();
        let sub = FsPath::new("/css").unwrap();
        let file = FsPath::new("/css/style.css").unwrap();

        assert_eq!(file.relative_to(&root), Some("css/style.css"));
        assert_eq!(file.relative_to(&sub), Some("style.css"));
        assert_eq!(file.relative_to(&FsPath::new("/css/").unwrap()), Some("style.css"));
        assert_eq!(file.relative_to(&FsPath::new("/cs").unwrap()), None);
        assert_eq!(sub.relative_to(&sub), None);
    }

    #[test]
    fn test_suffix_and_join() {
        let p = FsPath::new("/edit.htm").unwrap();
        assert_eq!(p.with_suffix(".gz").as_str(), "/edit.htm.gz");

        let dir = FsPath::new("/docs/").unwrap();
        assert_eq!(dir.with_suffix("index.htm").as_str(), "/docs/index.htm");
        assert_eq!(FsPath::root().join("a.txt").unwrap().as_str(), "/a.txt");
        assert_eq!(
            FsPath::new("/docs").unwrap().join("a.txt").unwrap().as_str(),
            "/docs/a.txt"
        );
        assert!(FsPath::root().join("..").is_err());
    }
}
