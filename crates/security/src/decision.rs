//! The per-call egress decision.

use serde::Serialize;

use crate::policy::AllowList;
use crate::resolver::ResolvedTarget;

/// The only scheme egress calls may use.
pub const SECURE_SCHEME: &str = "https";

/// Outcome for a single outbound call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    /// Not in the allow-list, but excused by the response's own policy header.
    Forward,
    /// Origin is in the allow-list; hand back the fetched response.
    PassThrough,
    /// Target does not use the secure scheme.
    InsecureTransport,
    /// Target origin is not permitted.
    PolicyViolation,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Forward | Decision::PassThrough)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Forward => "forward",
            Decision::PassThrough => "pass-through",
            Decision::InsecureTransport => "insecure-transport",
            Decision::PolicyViolation => "policy-violation",
        }
    }
}

/// Decide a call.
///
/// `target` is `None` when the call's target could not be resolved; such
/// calls are treated as violations. `response_policy` is the policy header
/// carried by the response, if any.
pub fn decide(
    target: Option<&ResolvedTarget>,
    allow_list: &AllowList,
    response_policy: Option<&str>,
) -> Decision {
    let Some(target) = target else {
        return Decision::PolicyViolation;
    };

    if target.scheme() != SECURE_SCHEME {
        return Decision::InsecureTransport;
    }

    if allow_list.permits(target) {
        return Decision::PassThrough;
    }

    // Substring test on the raw header text.
    if response_policy.is_some_and(|policy| policy.contains(&target.origin())) {
        return Decision::Forward;
    }

    Decision::PolicyViolation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationContext;
    use crate::policy::SourceMatching;
    use crate::resolver::{resolve, ResourceDescriptor};

    fn target(url: &str) -> ResolvedTarget {
        let context = NavigationContext::new("https://example.com", "example.com", "/");
        resolve(ResourceDescriptor::Text(url), &context).unwrap()
    }

    #[test]
    fn test_insecure_scheme_wins_over_allow_list() {
        let list = AllowList::from_policy("connect-src http://api.example.com *")
            .with_matching(SourceMatching::Keywords, None);

        assert_eq!(
            decide(Some(&target("http://api.example.com/x")), &list, None),
            Decision::InsecureTransport
        );
        assert_eq!(
            decide(
                Some(&target("http://api.example.com/x")),
                &list,
                Some("default-src http://api.example.com")
            ),
            Decision::InsecureTransport
        );
    }

    #[test]
    fn test_allow_listed_origin_passes_through() {
        let list = AllowList::from_policy("connect-src https://api.example.com");
        let decision = decide(Some(&target("https://api.example.com/orders")), &list, None);

        assert_eq!(decision, Decision::PassThrough);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_response_policy_excuses_origin() {
        let list = AllowList::from_policy("connect-src https://api.example.com");
        let decision = decide(
            Some(&target("https://partner.example.org/feed")),
            &list,
            Some("default-src 'self' https://partner.example.org"),
        );

        assert_eq!(decision, Decision::Forward);
    }

    #[test]
    fn test_response_policy_must_mention_origin() {
        let list = AllowList::from_policy("connect-src https://api.example.com");
        let decision = decide(
            Some(&target("https://partner.example.org/feed")),
            &list,
            Some("default-src 'self'"),
        );

        assert_eq!(decision, Decision::PolicyViolation);
    }

    #[test]
    fn test_unknown_origin_is_violation() {
        let list = AllowList::from_policy("connect-src https://api.example.com");
        let decision = decide(Some(&target("https://tracker.example.net/p")), &list, None);

        assert_eq!(decision, Decision::PolicyViolation);
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_unresolved_target_is_violation() {
        let list = AllowList::from_policy("default-src *");
        assert_eq!(decide(None, &list, None), Decision::PolicyViolation);
    }
}
