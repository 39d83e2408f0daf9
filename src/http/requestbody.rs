//! Request payloads and their wire encoding.

use crate::base::neterror::NetError;
use crate::http::multipart::Form;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// Payload of a request.
///
/// Structured values are JSON-encoded. Every other kind is already in wire
/// form and is sent untouched with its own `Content-Type` (or none for raw
/// bytes).
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
    Bytes(Bytes),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    Multipart(Form),
}

/// A body ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl RequestBody {
    /// JSON body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, NetError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| NetError::JsonEncodeError(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Encode into bytes plus the content type implied by the payload kind.
    /// `Empty` encodes to `None`.
    pub fn encode(&self) -> Result<Option<EncodedBody>, NetError> {
        let (bytes, content_type) = match self {
            RequestBody::Empty => return Ok(None),
            RequestBody::Json(value) => {
                let encoded = serde_json::to_vec(value)
                    .map_err(|e| NetError::JsonEncodeError(e.to_string()))?;
                (Bytes::from(encoded), Some("application/json".to_string()))
            }
            RequestBody::Text(text) => (
                Bytes::from(text.clone()),
                Some("text/plain;charset=UTF-8".to_string()),
            ),
            RequestBody::Bytes(bytes) => (bytes.clone(), None),
            RequestBody::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish();
                (
                    Bytes::from(encoded),
                    Some("application/x-www-form-urlencoded;charset=UTF-8".to_string()),
                )
            }
            RequestBody::Multipart(form) => (form.to_body(), Some(form.content_type())),
        };
        Ok(Some(EncodedBody {
            bytes,
            content_type,
        }))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Text(s)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl From<Form> for RequestBody {
    fn from(form: Form) -> Self {
        RequestBody::Multipart(form)
    }
}
