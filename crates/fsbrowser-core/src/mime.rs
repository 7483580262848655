//! Content type lookup by file suffix.

/// Media type for forced downloads.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Media type used for every JSON response.
pub const TEXT_JSON: &str = "text/json";

/// Media type for error bodies and unknown suffixes.
pub const TEXT_PLAIN: &str = "text/plain";

/// Media type of gzip archives.
pub const X_GZIP: &str = "application/x-gzip";

/// Suffix table, checked in order. Matching is case-sensitive.
const SUFFIXES: &[(&str, &str)] = &[
    (".htm", "text/html"),
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".jpg", "image/jpeg"),
    (".ico", "image/x-icon"),
    (".xml", "text/xml"),
    (".pdf", "application/x-pdf"),
    (".zip", "application/x-zip"),
    (".gz", X_GZIP),
];

/// Resolve the content type for `path`.
///
/// `download` forces `application/octet-stream` regardless of suffix.
pub fn content_type(path: &str, download: bool) -> &'static str {
    if download {
        return OCTET_STREAM;
    }
    SUFFIXES
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix))
        .map(|(_, mime)| *mime)
        .unwrap_or(TEXT_PLAIN)
}
