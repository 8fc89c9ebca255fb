//! Resolution of request targets to absolute URLs.
//!
//! Network calls accept a target in several shapes: an absolute URL, a
//! root-relative path, a `./` or `../` relative path, or a structured request
//! carrying its own URL. Everything is resolved against the page's current
//! origin and directory, without touching the network.

use thiserror::Error;
use url::Url;

use crate::navigation::NavigationContext;

const SAME_DIRECTORY: &str = ".";
const PARENT_DIRECTORY: &str = "..";
const ROOT: &str = "/";
const SCHEME_MARKER: &str = "http";

/// Resolution errors.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Invalid resource type provided to fetch request: {0:?}")]
    InvalidResourceType(String),
    #[error("Malformed request target {input:?}: {source}")]
    Malformed {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// A request target as handed to the network layer.
#[derive(Clone, Copy, Debug)]
pub enum ResourceDescriptor<'a> {
    /// URL or path string.
    Text(&'a str),
    /// Structured request; its URL is already absolute.
    Structured(&'a Url),
}

impl<'a> ResourceDescriptor<'a> {
    /// Raw form for logging.
    pub fn display(&self) -> &'a str {
        match self {
            ResourceDescriptor::Text(text) => text,
            ResourceDescriptor::Structured(url) => url.as_str(),
        }
    }
}

/// Absolute URL a call will reach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    url: Url,
}

impl ResolvedTarget {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Serialized origin, `"null"` when opaque.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

/// Resolve a descriptor under the given navigation context.
pub fn resolve(
    descriptor: ResourceDescriptor<'_>,
    context: &NavigationContext,
) -> Result<ResolvedTarget, ResolutionError> {
    let raw = match descriptor {
        ResourceDescriptor::Structured(url) => return Ok(ResolvedTarget::new(url.clone())),
        ResourceDescriptor::Text(raw) => raw,
    };

    // "./x" loses its leading dot and becomes "/x"; "../x" is left alone.
    let stripped = match raw.strip_prefix(SAME_DIRECTORY) {
        Some(rest) if !raw.starts_with(PARENT_DIRECTORY) => rest,
        _ => raw,
    };

    // Root-relative paths land here too: they carry no leading dot, so
    // `stripped == raw`.
    if stripped.starts_with(ROOT) {
        return join(context, stripped, raw);
    }

    if raw.starts_with(PARENT_DIRECTORY) {
        return join(context, raw, raw);
    }

    if raw.starts_with(SCHEME_MARKER) {
        return parse(raw, raw);
    }

    Err(ResolutionError::InvalidResourceType(raw.to_string()))
}

/// Append `relative` to the page origin and directory.
///
/// The directory ends with a separator, so one leading `/` of `relative` is
/// dropped to keep `/a/b/` + `/d` at `/a/b/d`.
fn join(
    context: &NavigationContext,
    relative: &str,
    raw: &str,
) -> Result<ResolvedTarget, ResolutionError> {
    let directory = context.directory();
    let relative = if directory.ends_with(ROOT) {
        relative.strip_prefix(ROOT).unwrap_or(relative)
    } else {
        relative
    };

    parse(&format!("{}{}{}", context.origin(), directory, relative), raw)
}

fn parse(candidate: &str, raw: &str) -> Result<ResolvedTarget, ResolutionError> {
    Url::parse(candidate)
        .map(ResolvedTarget::new)
        .map_err(|source| ResolutionError::Malformed {
            input: raw.to_string(),
            source,
        })
}
