use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// A header map that keeps insertion order and one value per name.
///
/// Names compare case-insensitively. Inserting an existing name updates the
/// value in place, so the first insertion fixes a header's position on the
/// wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedHeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let name = HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader)?;
        let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
        self.insert_typed(name, value);
        Ok(())
    }

    pub fn insert_typed(&mut self, name: HeaderName, value: HeaderValue) {
        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.headers.push((name, value));
        }
    }

    pub fn remove(&mut self, name: &str) {
        if let Ok(target) = HeaderName::from_str(name) {
            self.headers.retain(|(n, _)| n != target);
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let target = HeaderName::from_str(name).ok()?;
        self.headers
            .iter()
            .find(|(n, _)| *n == target)
            .map(|(_, v)| v)
    }

    /// Header value as text, `None` when absent or not visible ASCII.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Insert every entry of `other`, overriding names already present.
    pub fn extend(&mut self, other: &OrderedHeaderMap) {
        for (name, value) in other.iter() {
            self.insert_typed(name.clone(), value.clone());
        }
    }

    /// Merge `layers` in order; a later layer overrides earlier ones.
    pub fn merge<'a, I>(layers: I) -> OrderedHeaderMap
    where
        I: IntoIterator<Item = &'a OrderedHeaderMap>,
    {
        let mut merged = OrderedHeaderMap::new();
        for layer in layers {
            merged.extend(layer);
        }
        merged
    }

    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl From<&HeaderMap> for OrderedHeaderMap {
    /// Repeated names collapse to their last value.
    fn from(map: &HeaderMap) -> Self {
        let mut headers = OrderedHeaderMap::new();
        for (name, value) in map {
            headers.insert_typed(name.clone(), value.clone());
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> OrderedHeaderMap {
        let mut headers = OrderedHeaderMap::new();
        for (n, v) in pairs {
            headers.insert(n, v).unwrap();
        }
        headers
    }

    #[test]
    fn test_case_insensitive_get() {
        let headers = map(&[("ACCEPT", "text/html")]);
        assert_eq!(headers.get_str("accept"), Some("text/html"));
        assert!(headers.contains("Accept"));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut headers = map(&[("Host", "example.com"), ("Accept", "*/*")]);
        headers.insert("host", "updated.com").unwrap();

        let names: Vec<_> = headers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["host", "accept"]);
        assert_eq!(headers.get_str("Host"), Some("updated.com"));
    }

    #[test]
    fn test_remove_header() {
        let mut headers = map(&[("X-Custom", "value")]);
        headers.remove("x-custom");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut headers = OrderedHeaderMap::new();
        assert!(headers.insert("Invalid Header", "value").is_err());
        assert!(headers.insert("Valid", "invalid\nvalue").is_err());
    }

    #[test]
    fn test_merge_later_layers_win() {
        let defaults = map(&[("User-Agent", "ua"), ("Accept", "*/*")]);
        let cookies = map(&[("Cookie", "a=1")]);
        let explicit = map(&[("accept", "application/json"), ("Cookie", "b=2")]);

        let merged = OrderedHeaderMap::merge([&defaults, &cookies, &explicit]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get_str("Accept"), Some("application/json"));
        assert_eq!(merged.get_str("Cookie"), Some("b=2"));
        assert_eq!(merged.get_str("User-Agent"), Some("ua"));
    }

    #[test]
    fn test_to_header_map_preserves_order() {
        let headers = map(&[("Host", "example.com"), ("Accept", "text/html")]);
        let names: Vec<_> = headers.to_header_map().keys().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["host", "accept"]);
    }
}
