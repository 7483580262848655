//! Streaming `multipart/form-data` parser.
//!
//! The parser is sans-io: callers push body chunks of any size with
//! [`MultipartParser::feed`] and receive part events through a callback.
//! Part data is never buffered beyond one delimiter's worth of holdback, so
//! uploads larger than RAM stream straight to flash.
//!
//! A body looks like:
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="data"; filename="edit.htm"\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! <bytes>
//! \r\n--<boundary>--\r\n
//! ```

use thiserror::Error;

/// Upper bound for one part's header block.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// RFC 2046 limit on boundary length.
const MAX_BOUNDARY_LEN: usize = 70;

/// Headers of a single part that the file browser cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    /// Form field name from `Content-Disposition`.
    pub name: Option<String>,
    /// Client-side filename; present only for file fields.
    pub filename: Option<String>,
    /// Declared media type of the part.
    pub content_type: Option<String>,
}

impl PartHeaders {
    /// True if the part carries a file.
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

/// Parser output.
#[derive(Debug, PartialEq, Eq)]
pub enum MultipartEvent<'a> {
    /// A new part begins.
    PartStart(PartHeaders),
    /// Bytes of the current part, in order.
    PartData(&'a [u8]),
    /// The current part is complete.
    PartEnd,
}

/// Errors that can occur while parsing a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    #[error("Missing multipart boundary")]
    MissingBoundary,

    #[error("Multipart boundary longer than 70 bytes")]
    BoundaryTooLong,

    #[error("Part headers exceed 8 KiB")]
    HeadersTooLarge,

    #[error("Malformed part headers")]
    MalformedHeaders,

    #[error("Malformed delimiter line")]
    MalformedDelimiter,

    #[error("Body ended before the closing delimiter")]
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Skipping anything before the first delimiter.
    Preamble,
    /// Just consumed a delimiter; expecting `\r\n` or the closing `--`.
    AfterDelimiter,
    /// Collecting a part's header block.
    Headers,
    /// Emitting part data until the next delimiter.
    Body,
    /// Closing delimiter seen; everything else is ignored.
    Epilogue,
}

/// Incremental multipart parser.
#[derive(Debug)]
pub struct MultipartParser {
    /// `\r\n--<boundary>`
    delimiter: Vec<u8>,
    buf: Vec<u8>,
    state: State,
}

impl MultipartParser {
    /// Create a parser for the given boundary (without the leading `--`).
    pub fn new(boundary: &str) -> Result<Self, MultipartError> {
        if boundary.is_empty() {
            return Err(MultipartError::MissingBoundary);
        }
        if boundary.len() > MAX_BOUNDARY_LEN {
            return Err(MultipartError::BoundaryTooLong);
        }

        let mut delimiter = Vec::with_capacity(boundary.len() + 4);
        delimiter.extend_from_slice(b"\r\n--");
        delimiter.extend_from_slice(boundary.as_bytes());

        Ok(Self {
            delimiter,
            // The first delimiter has no preceding CRLF; seeding one lets a
            // single search handle every delimiter.
            buf: b"\r\n".to_vec(),
            state: State::Preamble,
        })
    }

    /// Create a parser from a `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Result<Self, MultipartError> {
        let boundary =
            boundary_from_content_type(content_type).ok_or(MultipartError::MissingBoundary)?;
        Self::new(boundary)
    }

    /// Push the next chunk of the body.
    pub fn feed<F>(&mut self, input: &[u8], mut on_event: F) -> Result<(), MultipartError>
    where
        F: FnMut(MultipartEvent<'_>),
    {
        self.buf.extend_from_slice(input);
        let holdback = self.delimiter.len() - 1;

        loop {
            match self.state {
                State::Preamble => match find(&self.buf, &self.delimiter) {
                    Some(pos) => {
                        self.buf.drain(..pos + self.delimiter.len());
                        self.state = State::AfterDelimiter;
                    }
                    None => {
                        if self.buf.len() > holdback {
                            let excess = self.buf.len() - holdback;
                            self.buf.drain(..excess);
                        }
                        return Ok(());
                    }
                },
                State::AfterDelimiter => {
                    // Transport padding is allowed between the boundary and CRLF.
                    let padding = self
                        .buf
                        .iter()
                        .take_while(|b| **b == b' ' || **b == b'\t')
                        .count();
                    self.buf.drain(..padding);

                    if self.buf.len() < 2 {
                        return Ok(());
                    }
                    if self.buf.starts_with(b"--") {
                        self.state = State::Epilogue;
                    } else if self.buf.starts_with(b"\r\n") {
                        self.buf.drain(..2);
                        self.state = State::Headers;
                    } else {
                        return Err(MultipartError::MalformedDelimiter);
                    }
                }
                State::Headers => {
                    if self.buf.starts_with(b"\r\n") {
                        // Part without headers.
                        self.buf.drain(..2);
                        self.state = State::Body;
                        on_event(MultipartEvent::PartStart(PartHeaders::default()));
                        continue;
                    }
                    match find(&self.buf, b"\r\n\r\n") {
                        Some(pos) => {
                            let headers = parse_part_headers(&self.buf[..pos])?;
                            self.buf.drain(..pos + 4);
                            self.state = State::Body;
                            on_event(MultipartEvent::PartStart(headers));
                        }
                        None => {
                            if self.buf.len() > MAX_HEADER_BYTES {
                                return Err(MultipartError::HeadersTooLarge);
                            }
                            return Ok(());
                        }
                    }
                }
                State::Body => match find(&self.buf, &self.delimiter) {
                    Some(pos) => {
                        if pos > 0 {
                            on_event(MultipartEvent::PartData(&self.buf[..pos]));
                        }
                        on_event(MultipartEvent::PartEnd);
                        self.buf.drain(..pos + self.delimiter.len());
                        self.state = State::AfterDelimiter;
                    }
                    None => {
                        if self.buf.len() > holdback {
                            let safe = self.buf.len() - holdback;
                            on_event(MultipartEvent::PartData(&self.buf[..safe]));
                            self.buf.drain(..safe);
                        }
                        return Ok(());
                    }
                },
                State::Epilogue => {
                    self.buf.clear();
                    return Ok(());
                }
            }
        }
    }

    /// True once the closing delimiter has been seen.
    pub fn is_complete(&self) -> bool {
        self.state == State::Epilogue
    }

    /// Signal the end of the body.
    pub fn finish(&self) -> Result<(), MultipartError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(MultipartError::Truncated)
        }
    }
}

/// Extract the boundary parameter from a `multipart/*` content type.
pub fn boundary_from_content_type(content_type: &str) -> Option<&str> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim();
    if !mime
        .get(..10)
        .is_some_and(|p| p.eq_ignore_ascii_case("multipart/"))
    {
        return None;
    }

    params.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        (!value.is_empty()).then_some(value)
    })
}

fn parse_part_headers(block: &[u8]) -> Result<PartHeaders, MultipartError> {
    let text = std::str::from_utf8(block).map_err(|_| MultipartError::MalformedHeaders)?;
    let mut headers = PartHeaders::default();

    for line in text.split("\r\n").filter(|l| !l.is_empty()) {
        let (key, value) = line
            .split_once(':')
            .ok_or(MultipartError::MalformedHeaders)?;
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("content-disposition") {
            for param in split_params(value).into_iter().skip(1) {
                let Some((k, v)) = param.split_once('=') else {
                    continue;
                };
                let k = k.trim();
                if k.eq_ignore_ascii_case("name") {
                    headers.name = Some(unquote(v.trim()));
                } else if k.eq_ignore_ascii_case("filename") {
                    headers.filename = Some(unquote(v.trim()));
                }
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            headers.content_type = Some(value.to_string());
        }
    }

    Ok(headers)
}

/// Split a header value on `;` outside of quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => value.to_string(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Part {
        headers: PartHeaders,
        data: Vec<u8>,
        ended: bool,
    }

    /// Feed `body` in chunks of `chunk` bytes and collect the parts.
    fn parse(boundary: &str, body: &[u8], chunk: usize) -> (Vec<Part>, MultipartParser) {
        let mut parser = MultipartParser::new(boundary).unwrap();
        let mut parts: Vec<Part> = Vec::new();

        for piece in body.chunks(chunk) {
            parser
                .feed(piece, |event| match event {
                    MultipartEvent::PartStart(headers) => parts.push(Part {
                        headers,
                        data: Vec::new(),
                        ended: false,
                    }),
                    MultipartEvent::PartData(bytes) => {
                        parts.last_mut().unwrap().data.extend_from_slice(bytes)
                    }
                    MultipartEvent::PartEnd => parts.last_mut().unwrap().ended = true,
                })
                .unwrap();
        }
        (parts, parser)
    }

    fn sample_body() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"preamble to ignore\r\n");
        body.extend_from_slice(b"--XyZ\r\n");
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"path\"\r\n\r\n");
        body.extend_from_slice(b"/notes.txt");
        body.extend_from_slice(b"\r\n--XyZ\r\n");
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"data\"; filename=\"a;b.bin\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(b"\x00\x01\r\n--Xy\r\nnot a delimiter\xff");
        body.extend_from_slice(b"\r\n--XyZ--\r\n");
        body
    }

    #[test]
    fn test_parses_fields_and_files() {
        let (parts, parser) = parse("XyZ", &sample_body(), 4096);
        assert!(parser.finish().is_ok());
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].headers.name.as_deref(), Some("path"));
        assert!(!parts[0].headers.is_file());
        assert_eq!(parts[0].data, b"/notes.txt");
        assert!(parts[0].ended);

        assert_eq!(parts[1].headers.name.as_deref(), Some("data"));
        assert_eq!(parts[1].headers.filename.as_deref(), Some("a;b.bin"));
        assert_eq!(
            parts[1].headers.content_type.as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(parts[1].data, b"\x00\x01\r\n--Xy\r\nnot a delimiter\xff");
        assert!(parts[1].ended);
    }

    #[test]
    fn test_chunking_does_not_change_output() {
        let body = sample_body();
        let (whole, _) = parse("XyZ", &body, body.len());
        for chunk in [1, 2, 3, 5, 7, 16] {
            let (split, parser) = parse("XyZ", &body, chunk);
            assert_eq!(split, whole, "chunk size {}", chunk);
            assert!(parser.is_complete());
        }
    }

    #[test]
    fn test_truncated_body() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"f\"; filename=\"x\"\r\n\r\nabc";
        let (parts, parser) = parse("b", body, 64);
        assert_eq!(parts.len(), 1);
        assert!(!parts[0].ended);
        assert_eq!(parser.finish(), Err(MultipartError::Truncated));
    }

    #[test]
    fn test_empty_part_and_no_headers() {
        let body = b"--b\r\n\r\n\r\n--b\r\nContent-Disposition: form-data; name=\"e\"\r\n\r\n\r\n--b--";
        let (parts, parser) = parse("b", body, 3);
        assert!(parser.is_complete());
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].headers, PartHeaders::default());
        assert!(parts[0].data.is_empty());
        assert_eq!(parts[1].headers.name.as_deref(), Some("e"));
        assert!(parts[1].data.is_empty());
    }

    #[test]
    fn test_malformed_input() {
        let mut parser = MultipartParser::new("b").unwrap();
        assert_eq!(
            parser.feed(b"--bXX", |_| {}),
            Err(MultipartError::MalformedDelimiter)
        );

        let mut parser = MultipartParser::new("b").unwrap();
        let mut huge = b"--b\r\nX-Pad: ".to_vec();
        huge.extend(std::iter::repeat(b'a').take(MAX_HEADER_BYTES + 1));
        assert_eq!(
            parser.feed(&huge, |_| {}),
            Err(MultipartError::HeadersTooLarge)
        );

        assert_eq!(
            MultipartParser::new("").unwrap_err(),
            MultipartError::MissingBoundary
        );
        assert_eq!(
            MultipartParser::new(&"x".repeat(71)).unwrap_err(),
            MultipartError::BoundaryTooLong
        );
    }

    #[test]
    fn test_boundary_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=----abc123"),
            Some("----abc123")
        );
        assert_eq!(
            boundary_from_content_type("Multipart/Form-Data; charset=utf-8; Boundary=\"q t\""),
            Some("q t")
        );
        assert_eq!(boundary_from_content_type("text/plain; boundary=x"), None);
        assert_eq!(boundary_from_content_type("multipart/form-data"), None);
        assert_eq!(boundary_from_content_type("multipart/form-data; boundary="), None);
    }
}
