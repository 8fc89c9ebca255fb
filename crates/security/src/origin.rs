//! Origin (scheme, host, port) handling.

use std::fmt;
use url::Url;

/// Represents an origin (scheme, host, port tuple).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl Origin {
    /// Create a new origin from components.
    pub fn new(scheme: &str, host: &str, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.to_lowercase(),
            host: host.to_lowercase(),
            port,
        }
    }

    /// Take the origin of a URL. Opaque origins (data:, file:, ...) yield `None`.
    pub fn from_url(url: &Url) -> Option<Self> {
        let scheme = url.scheme().to_lowercase();

        if matches!(scheme.as_str(), "data" | "file" | "blob" | "javascript" | "about") {
            return None;
        }

        let host = url.host_str()?.to_lowercase();
        let port = url.port_or_known_default();

        Some(Self { scheme, host, port })
    }

    /// Parse an origin from a string URL.
    pub fn parse(url_str: &str) -> Option<Self> {
        let url = Url::parse(url_str).ok()?;
        Self::from_url(&url)
    }

    /// Check if this origin is the same as another.
    pub fn is_same_origin(&self, other: &Origin) -> bool {
        self.scheme == other.scheme
            && self.host == other.host
            && self.effective_port() == other.effective_port()
    }

    /// Check if this origin is same-origin with a URL.
    pub fn is_same_origin_with_url(&self, url: &Url) -> bool {
        Origin::from_url(url)
            .map(|other| self.is_same_origin(&other))
            .unwrap_or(false)
    }

    /// Get the effective port (using default ports for known schemes).
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| default_port(&self.scheme).unwrap_or(0))
    }

    /// Whether the origin uses the secure transport scheme.
    pub fn is_secure(&self) -> bool {
        matches!(self.scheme.as_str(), "https" | "wss")
    }

    /// Serialize the origin the way `location.origin` does.
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "ftp" => Some(21),
        _ => None,
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) if Some(port) != default_port(&self.scheme) => {
                write!(f, "{}://{}:{}", self.scheme, self.host, port)
            }
            _ => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}
