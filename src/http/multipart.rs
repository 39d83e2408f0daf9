//! `multipart/form-data` bodies (RFC 7578).
//!
//! ```
//! use requestly::http::multipart::{Form, Part};
//!
//! let form = Form::new()
//!     .text("username", "user123")
//!     .part("file", Part::bytes(&b"file content"[..]).file_name("doc.txt"));
//! assert!(form.content_type().starts_with("multipart/form-data; boundary="));
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

static BOUNDARY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A multipart form. Cloning keeps the boundary, so a clone encodes to the
/// same bytes and can be sent again on retry.
#[derive(Debug, Clone)]
pub struct Form {
    boundary: String,
    fields: Vec<(Cow<'static, str>, Part)>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    pub fn new() -> Self {
        Self {
            boundary: generate_boundary(),
            fields: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Add a text field.
    pub fn text<N, V>(self, name: N, value: V) -> Self
    where
        N: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        self.part(name, Part::text(value))
    }

    pub fn part<N>(mut self, name: N, part: Part) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        self.fields.push((name.into(), part));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Content-Type` value carrying the boundary.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode the form. An empty form encodes to an empty body.
    pub fn to_body(&self) -> Bytes {
        if self.fields.is_empty() {
            return Bytes::new();
        }

        let mut out = BytesMut::new();
        for (name, part) in &self.fields {
            out.put_slice(b"--");
            out.put_slice(self.boundary.as_bytes());
            out.put_slice(b"\r\n");
            out.put_slice(part.headers(name).as_bytes());
            out.put_slice(b"\r\n\r\n");
            out.put_slice(&part.data);
            out.put_slice(b"\r\n");
        }
        out.put_slice(b"--");
        out.put_slice(self.boundary.as_bytes());
        out.put_slice(b"--\r\n");
        out.freeze()
    }
}

/// One field of a [`Form`].
#[derive(Debug, Clone)]
pub struct Part {
    data: Bytes,
    mime: Option<String>,
    file_name: Option<Cow<'static, str>>,
}

impl Part {
    pub fn text<V>(value: V) -> Self
    where
        V: Into<Cow<'static, str>>,
    {
        Self {
            data: Bytes::from(value.into().into_owned()),
            mime: None,
            file_name: None,
        }
    }

    pub fn bytes<B>(data: B) -> Self
    where
        B: Into<Bytes>,
    {
        Self {
            data: data.into(),
            mime: Some("application/octet-stream".to_string()),
            file_name: None,
        }
    }

    pub fn mime_str<S: Into<String>>(mut self, mime: S) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn file_name<S>(mut self, name: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.file_name = Some(name.into());
        self
    }

    fn headers(&self, name: &str) -> String {
        let mut header = format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quotes(name)
        );
        if let Some(file_name) = &self.file_name {
            header.push_str(&format!("; filename=\"{}\"", escape_quotes(file_name)));
        }
        if let Some(mime) = &self.mime {
            header.push_str("\r\nContent-Type: ");
            header.push_str(mime);
        }
        header
    }
}

fn escape_quotes(s: &str) -> Cow<'_, str> {
    if s.contains(['"', '\\', '\r', '\n']) {
        Cow::Owned(
            s.replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        )
    } else {
        Cow::Borrowed(s)
    }
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("----requestly-boundary-{:016x}{:04x}", nanos, seq & 0xffff)
}
