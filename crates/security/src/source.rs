//! Source expressions, used when allow-list keywords are interpreted.

use url::Url;

use crate::origin::Origin;

/// A single source token of a declared policy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceExpression {
    /// 'none' - nothing allowed
    None,
    /// 'self' - the page's own origin
    SelfOrigin,
    /// `*` - any network scheme
    Wildcard,
    /// Scheme source (e.g., "https:")
    Scheme(String),
    /// Host source (e.g., "example.com", "*.example.com", "https://api.example.com:8443/v1")
    Host {
        scheme: Option<String>,
        host: String,
        port: Option<u16>,
        path: Option<String>,
    },
    /// Nonces, hashes and script keywords; they never authorize a network call.
    Keyword(String),
}

impl SourceExpression {
    /// Parse a source token.
    pub fn parse(source: &str) -> Self {
        let lowered = source.to_lowercase();
        match lowered.as_str() {
            "'none'" => SourceExpression::None,
            "'self'" => SourceExpression::SelfOrigin,
            "*" => SourceExpression::Wildcard,
            s if s.starts_with('\'') => SourceExpression::Keyword(s.to_string()),
            s if s.ends_with(':') => SourceExpression::Scheme(s[..s.len() - 1].to_string()),
            s => Self::parse_host(s),
        }
    }

    fn parse_host(source: &str) -> Self {
        let mut scheme = None;
        let mut rest = source;

        if let Some(idx) = rest.find("://") {
            scheme = Some(rest[..idx].to_string());
            rest = &rest[idx + 3..];
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], Some(rest[idx..].to_string())),
            None => (rest, None),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host, Some(port)),
                Err(_) => (authority, None),
            },
            None => (authority, None),
        };

        SourceExpression::Host {
            scheme,
            host: host.to_string(),
            port,
            path,
        }
    }

    /// Check if this source authorizes a request to `url` from a page at `page`.
    pub fn matches(&self, url: &Url, page: Option<&Origin>) -> bool {
        match self {
            SourceExpression::None | SourceExpression::Keyword(_) => false,
            SourceExpression::SelfOrigin => page
                .map(|origin| origin.is_same_origin_with_url(url))
                .unwrap_or(false),
            SourceExpression::Wildcard => matches!(url.scheme(), "http" | "https" | "ws" | "wss"),
            SourceExpression::Scheme(scheme) => url.scheme() == scheme,
            SourceExpression::Host {
                scheme,
                host,
                port,
                path,
            } => {
                if let Some(s) = scheme {
                    if url.scheme() != s {
                        return false;
                    }
                }

                let url_host = url.host_str().unwrap_or("");
                if let Some(suffix) = host.strip_prefix("*.") {
                    // Wildcards cover subdomains only, never the bare domain.
                    if !url_host.ends_with(&format!(".{}", suffix)) {
                        return false;
                    }
                } else if url_host != host {
                    return false;
                }

                let url_port = url.port_or_known_default();
                match port {
                    Some(p) if url_port != Some(*p) => return false,
                    None if url.port().is_some() => return false,
                    _ => {}
                }

                if let Some(p) = path {
                    if !url.path().starts_with(p.as_str()) {
                        return false;
                    }
                }

                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(SourceExpression::parse("'self'"), SourceExpression::SelfOrigin);
        assert_eq!(SourceExpression::parse("'NONE'"), SourceExpression::None);
        assert_eq!(SourceExpression::parse("*"), SourceExpression::Wildcard);
        assert_eq!(
            SourceExpression::parse("https:"),
            SourceExpression::Scheme("https".to_string())
        );
        assert!(matches!(
            SourceExpression::parse("'nonce-abc123'"),
            SourceExpression::Keyword(_)
        ));
    }

    #[test]
    fn test_parse_host_with_port_and_path() {
        assert_eq!(
            SourceExpression::parse("https://api.example.com:8443/v1"),
            SourceExpression::Host {
                scheme: Some("https".to_string()),
                host: "api.example.com".to_string(),
                port: Some(8443),
                path: Some("/v1".to_string()),
            }
        );
    }

    #[test]
    fn test_self_needs_page_origin() {
        let page = Origin::parse("https://example.com").unwrap();
        let source = SourceExpression::SelfOrigin;

        assert!(source.matches(&url("https://example.com/api"), Some(&page)));
        assert!(!source.matches(&url("https://cdn.example.com/api"), Some(&page)));
        assert!(!source.matches(&url("https://example.com/api"), None));
    }

    #[test]
    fn test_wildcard_host() {
        let source = SourceExpression::parse("*.example.com");

        assert!(source.matches(&url("https://cdn.example.com/x"), None));
        assert!(source.matches(&url("https://a.b.example.com/x"), None));
        assert!(!source.matches(&url("https://example.com/x"), None));
        assert!(!source.matches(&url("https://evilexample.com/x"), None));
    }

    #[test]
    fn test_host_port_must_match() {
        let source = SourceExpression::parse("https://api.example.com");

        assert!(source.matches(&url("https://api.example.com/"), None));
        assert!(source.matches(&url("https://api.example.com:443/"), None));
        assert!(!source.matches(&url("https://api.example.com:8443/"), None));
        assert!(!source.matches(&url("http://api.example.com/"), None));
    }

    #[test]
    fn test_path_prefix() {
        let source = SourceExpression::parse("https://api.example.com/v1");

        assert!(source.matches(&url("https://api.example.com/v1/orders"), None));
        assert!(!source.matches(&url("https://api.example.com/v2/orders"), None));
    }

    #[test]
    fn test_none_and_keywords_never_match() {
        let target = url("https://example.com/");
        let page = Origin::parse("https://example.com").unwrap();

        assert!(!SourceExpression::None.matches(&target, Some(&page)));
        assert!(!SourceExpression::parse("'unsafe-inline'").matches(&target, Some(&page)));
    }
}
