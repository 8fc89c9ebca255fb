//! HTTP response handling.

use bytes::Bytes;
use http::StatusCode;
use url::Url;

use crate::client::ClientError;
use crate::headers::HeaderMap;

/// A completed HTTP response.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Final URL (after redirects).
    pub url: Url,
    body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, url: Url) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url,
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Drain a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let url = response.url().clone();
        let headers = HeaderMap::from_reqwest(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Response(e.to_string()))?;

        Ok(Self {
            status,
            headers,
            url,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let url = Url::parse("https://example.com/data").unwrap();
        let response = Response::new(StatusCode::OK, url)
            .with_header("Content-Security-Policy", "default-src 'self'")
            .with_body("{\"ok\":true}");

        assert!(response.is_success());
        assert_eq!(response.headers().content_security_policy(), Some("default-src 'self'"));
        assert_eq!(response.text(), "{\"ok\":true}");
    }
}
