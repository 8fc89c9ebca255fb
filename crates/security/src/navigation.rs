//! The page's navigation state.

use parking_lot::RwLock;
use std::sync::Arc;
use url::Url;

use crate::origin::Origin;

/// Snapshot of where the page currently is.
///
/// Taken fresh for every resolution, since the page may navigate between
/// calls (history API, fragment changes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationContext {
    /// Serialized origin, `"null"` for opaque documents.
    origin: String,
    hostname: String,
    path: String,
}

impl NavigationContext {
    pub fn new(origin: impl Into<String>, hostname: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            hostname: hostname.into(),
            path: path.into(),
        }
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            origin: url.origin().ascii_serialization(),
            hostname: url.host_str().unwrap_or("").to_string(),
            path: url.path().to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Structured form of the page origin, if it is not opaque.
    pub fn page_origin(&self) -> Option<Origin> {
        Origin::parse(&self.origin)
    }

    /// The path truncated after its last separator.
    ///
    /// A path whose last `/` is already the final character (or that has no
    /// separator at all) is returned unchanged.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) if idx + 1 < self.path.len() => &self.path[..=idx],
            _ => &self.path,
        }
    }
}

/// Shared handle to the page's live URL.
#[derive(Clone, Debug)]
pub struct Location {
    url: Arc<RwLock<Url>>,
}

impl Location {
    pub fn new(url: Url) -> Self {
        Self {
            url: Arc::new(RwLock::new(url)),
        }
    }

    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Current URL.
    pub fn url(&self) -> Url {
        self.url.read().clone()
    }

    /// Replace the current URL. All clones observe the change.
    pub fn navigate(&self, url: Url) {
        tracing::debug!(to = %url, "location changed");
        *self.url.write() = url;
    }

    pub fn snapshot(&self) -> NavigationContext {
        NavigationContext::from_url(&self.url.read())
    }
}
