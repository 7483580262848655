//! Request arguments.
//!
//! Handlers address arguments either by name (`dir`, `download`) or by
//! position (`arg0` is the target path for create and delete, whatever the
//! field is called). Arguments come from the query string first, then from
//! form fields in the body, in the order they appear.

use url::form_urlencoded;

use crate::multipart::{MultipartError, MultipartEvent, MultipartParser};

/// Ordered list of request arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    pairs: Vec<(String, String)>,
}

impl RequestArgs {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (still percent-encoded) query string.
    pub fn from_query(query: &str) -> Self {
        let mut args = Self::new();
        args.extend_urlencoded(query.as_bytes());
        args
    }

    /// Append an argument.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Append arguments from an `application/x-www-form-urlencoded` payload.
    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        self.pairs.extend(
            form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    /// Append form fields from a request body, based on its content type.
    ///
    /// Url-encoded bodies and the non-file fields of multipart bodies are
    /// read; anything else is ignored.
    pub fn extend_from_body(
        &mut self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<(), MultipartError> {
        let Some(content_type) = content_type else {
            return Ok(());
        };
        let mime = content_type.split(';').next().unwrap_or("").trim();

        if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            self.extend_urlencoded(body);
        } else if mime.eq_ignore_ascii_case("multipart/form-data") {
            let mut parser = MultipartParser::from_content_type(content_type)?;
            let mut field: Option<(String, Vec<u8>)> = None;
            parser.feed(body, |event| match event {
                MultipartEvent::PartStart(headers) => {
                    field = match (headers.is_file(), headers.name) {
                        (false, Some(name)) => Some((name, Vec::new())),
                        _ => None,
                    };
                }
                MultipartEvent::PartData(bytes) => {
                    if let Some((_, value)) = field.as_mut() {
                        value.extend_from_slice(bytes);
                    }
                }
                MultipartEvent::PartEnd => {
                    if let Some((name, value)) = field.take() {
                        self.pairs
                            .push((name, String::from_utf8_lossy(&value).into_owned()));
                    }
                }
            })?;
            parser.finish()?;
        }
        Ok(())
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Value of the first argument, whatever its name.
    pub fn first(&self) -> Option<&str> {
        self.pairs.first().map(|(_, v)| v.as_str())
    }

    /// Value of the first argument called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// True if an argument called `name` is present, even with an empty value.
    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for RequestArgs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
