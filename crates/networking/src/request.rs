//! Outbound calls as issued by page code.

use bytes::Bytes;
use guard_security::ResourceDescriptor;
use http::Method;
use std::time::Duration;
use url::Url;

use crate::headers::HeaderMap;

/// A structured request object. Its URL is always absolute.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The first argument of a network call.
#[derive(Clone, Debug)]
pub enum Resource {
    /// Absolute URL or relative path, exactly as written by the caller.
    Url(String),
    Request(Request),
}

impl Resource {
    pub fn descriptor(&self) -> ResourceDescriptor<'_> {
        match self {
            Resource::Url(url) => ResourceDescriptor::Text(url),
            Resource::Request(request) => ResourceDescriptor::Structured(&request.url),
        }
    }
}

impl From<&str> for Resource {
    fn from(url: &str) -> Self {
        Resource::Url(url.to_string())
    }
}

impl From<String> for Resource {
    fn from(url: String) -> Self {
        Resource::Url(url)
    }
}

impl From<Request> for Resource {
    fn from(request: Request) -> Self {
        Resource::Request(request)
    }
}

/// The second argument of a network call. Overrides fields of a structured
/// request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// `(resource, options)` as submitted to the network primitive.
#[derive(Clone, Debug)]
pub struct OutboundCall {
    pub resource: Resource,
    pub options: RequestOptions,
}

impl OutboundCall {
    pub fn new(resource: impl Into<Resource>, options: RequestOptions) -> Self {
        Self {
            resource: resource.into(),
            options,
        }
    }

    /// A call with default options.
    pub fn get(resource: impl Into<Resource>) -> Self {
        Self::new(resource, RequestOptions::default())
    }

    pub fn descriptor(&self) -> ResourceDescriptor<'_> {
        self.resource.descriptor()
    }

    /// The same call aimed at `url`, keeping method, headers, body and options.
    pub fn routed_to(&self, url: &Url) -> Self {
        let resource = match &self.resource {
            Resource::Url(_) => Resource::Url(url.to_string()),
            Resource::Request(request) => {
                let mut request = request.clone();
                request.url = url.clone();
                Resource::Request(request)
            }
        };
        Self {
            resource,
            options: self.options.clone(),
        }
    }

    /// Effective method: options win over the structured request.
    pub fn method(&self) -> Method {
        match (&self.options.method, &self.resource) {
            (Some(method), _) => method.clone(),
            (None, Resource::Request(request)) => request.method.clone(),
            (None, Resource::Url(_)) => Method::GET,
        }
    }

    /// Effective headers: the structured request's, overlaid by the options'.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = match &self.resource {
            Resource::Request(request) => request.headers.clone(),
            Resource::Url(_) => HeaderMap::new(),
        };
        for (name, value) in self.options.headers.iter() {
            headers.insert(name, value);
        }
        headers
    }

    /// Effective body: options win over the structured request.
    pub fn body(&self) -> Option<Bytes> {
        match (&self.options.body, &self.resource) {
            (Some(body), _) => Some(body.clone()),
            (None, Resource::Request(request)) => request.body.clone(),
            (None, Resource::Url(_)) => None,
        }
    }
}
