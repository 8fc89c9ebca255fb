//! Violation reports for rejected calls.

use serde::Serialize;

use crate::decision::Decision;

/// Directive named in reports; egress is governed by connect sources.
pub const EGRESS_DIRECTIVE: &str = "connect-src";

/// A rejected outbound call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ViolationReport {
    pub document_uri: String,
    pub blocked_uri: String,
    pub violated_directive: String,
    pub original_policy: String,
    pub disposition: Decision,
}

impl ViolationReport {
    pub fn new(
        document_uri: impl Into<String>,
        blocked_uri: impl Into<String>,
        original_policy: impl Into<String>,
        disposition: Decision,
    ) -> Self {
        Self {
            document_uri: document_uri.into(),
            blocked_uri: blocked_uri.into(),
            violated_directive: EGRESS_DIRECTIVE.to_string(),
            original_policy: original_policy.into(),
            disposition,
        }
    }

    /// Report body in the `csp-report` envelope.
    pub fn to_report(&self) -> serde_json::Value {
        serde_json::json!({ "csp-report": self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_shape() {
        let report = ViolationReport::new(
            "https://example.com/app",
            "https://tracker.example.net/p",
            "default-src 'self'",
            Decision::PolicyViolation,
        );
        let json = report.to_report();

        assert_eq!(json["csp-report"]["blocked-uri"], "https://tracker.example.net/p");
        assert_eq!(json["csp-report"]["violated-directive"], "connect-src");
        assert_eq!(json["csp-report"]["disposition"], "policy-violation");
        assert_eq!(json["csp-report"]["original-policy"], "default-src 'self'");
    }
}
