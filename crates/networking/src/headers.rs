//! HTTP header handling.

use indexmap::IndexMap;
use std::fmt;

/// HTTP header map (case-insensitive keys, order-preserving).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    headers: IndexMap<String, String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Insert a header, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.headers.shift_remove(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy the textual headers of a reqwest response. Repeated headers are
    /// joined with `", "`; values that are not visible ASCII are dropped.
    pub fn from_reqwest(source: &reqwest::header::HeaderMap) -> Self {
        let mut headers = Self::new();
        for (name, value) in source {
            let Ok(value) = value.to_str() else {
                continue;
            };
            match headers.headers.get_mut(name.as_str()) {
                Some(existing) => {
                    existing.push_str(", ");
                    existing.push_str(value);
                }
                None => headers.insert(name.as_str(), value),
            }
        }
        headers
    }

    /// The response's own `Content-Security-Policy`.
    pub fn content_security_policy(&self) -> Option<&str> {
        self.get(names::CONTENT_SECURITY_POLICY)
    }

    /// The transport-identity marker asserted by the server.
    pub fn transport_identity(&self) -> Option<&str> {
        self.get(names::TRANSPORT_IDENTITY)
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            writeln!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Header names the guard reads.
pub mod names {
    pub const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
    /// Non-standard header some servers use to echo their certificate subject.
    pub const TRANSPORT_IDENTITY: &str = "ssl-cert";
}
