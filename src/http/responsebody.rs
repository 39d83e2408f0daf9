//! Buffered response bodies and their decoded form.

use crate::base::neterror::NetError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Raw body bytes of a response, fully read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBody {
    bytes: Bytes,
}

impl ResponseBody {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Body as UTF-8; invalid sequences become U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.bytes).map_err(|e| NetError::JsonParseError(e.to_string()))
    }

    /// Decode as JSON when `content_type` contains `application/json`,
    /// as text otherwise. An empty JSON body decodes to `null`.
    pub fn decode(&self, content_type: Option<&str>) -> Result<ResponseData, NetError> {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if !is_json {
            return Ok(ResponseData::Text(self.text()));
        }
        if self.bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ResponseData::Json(Value::Null));
        }
        self.json().map(ResponseData::Json)
    }
}

/// Decoded body carried by a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(Value),
    Text(String),
}

impl ResponseData {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(v) => Some(v),
            ResponseData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(s) => Some(s),
            ResponseData::Json(_) => None,
        }
    }

    /// Convert JSON data into `T`. Text data is parsed as JSON first.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetError> {
        match self {
            ResponseData::Json(v) => {
                T::deserialize(v).map_err(|e| NetError::JsonParseError(e.to_string()))
            }
            ResponseData::Text(s) => {
                serde_json::from_str(s).map_err(|e| NetError::JsonParseError(e.to_string()))
            }
        }
    }
}

impl From<Value> for ResponseData {
    fn from(value: Value) -> Self {
        ResponseData::Json(value)
    }
}

impl From<String> for ResponseData {
    fn from(text: String) -> Self {
        ResponseData::Text(text)
    }
}

impl From<&str> for ResponseData {
    fn from(text: &str) -> Self {
        ResponseData::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_by_content_type() {
        let body = ResponseBody::new(Bytes::from_static(br#"{"a":1}"#));
        let data = body.decode(Some("application/json; charset=utf-8")).unwrap();
        assert_eq!(data, ResponseData::Json(json!({"a": 1})));
    }

    #[test]
    fn test_decode_text_otherwise() {
        let body = ResponseBody::new(Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(body.decode(Some("text/plain")).unwrap().as_text(), Some(r#"{"a":1}"#));
        assert!(body.decode(None).unwrap().as_text().is_some());
    }

    #[test]
    fn test_empty_json_body_is_null() {
        let body = ResponseBody::default();
        assert_eq!(
            body.decode(Some("application/json")).unwrap(),
            ResponseData::Json(Value::Null)
        );
    }

    #[test]
    fn test_invalid_json_fails() {
        let body = ResponseBody::new(Bytes::from_static(b"{nope"));
        let err = body.decode(Some("application/json")).unwrap_err();
        assert!(matches!(err, NetError::JsonParseError(_)));
    }

    #[test]
    fn test_lossy_text() {
        let body = ResponseBody::new(Bytes::from_static(b"ok\xff"));
        assert_eq!(body.text(), "ok\u{fffd}");
    }

    #[test]
    fn test_typed_data() {
        let data = ResponseData::Json(json!({"x": [1, 2]}));
        let parsed: std::collections::HashMap<String, Vec<u8>> = data.json().unwrap();
        assert_eq!(parsed["x"], vec![1, 2]);
    }
}
