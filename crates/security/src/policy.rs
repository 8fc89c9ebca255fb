//! Declared policy parsing and the page allow-list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::navigation::NavigationContext;
use crate::origin::Origin;
use crate::resolver::ResolvedTarget;
use crate::source::SourceExpression;

/// Directive names containing this marker contribute to the allow-list.
pub const NETWORK_SOURCE_MARKER: &str = "src";

/// One `name token token ...` directive of a declared policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySource {
    pub name: String,
    pub tokens: Vec<String>,
}

impl PolicySource {
    /// Split a policy string into its directives.
    pub fn parse_all(policy: &str) -> Vec<PolicySource> {
        policy
            .split(';')
            .filter_map(|directive| {
                let mut parts = directive.split_whitespace();
                let name = parts.next()?;
                Some(PolicySource {
                    name: name.to_string(),
                    tokens: parts.map(str::to_string).collect(),
                })
            })
            .collect()
    }

    /// Any directive whose name mentions `src` counts, not just `connect-src`.
    pub fn is_network_source(&self) -> bool {
        self.name.contains(NETWORK_SOURCE_MARKER)
    }
}

/// How allow-list tokens are compared against a request origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMatching {
    /// Raw token equals the serialized origin. `'self'`, `*` and host
    /// patterns authorize nothing.
    #[default]
    Literal,
    /// Literal matches, plus `'self'`, `*`, scheme sources, wildcard hosts,
    /// ports and paths are interpreted.
    Keywords,
}

/// Set of permitted sources for the page's lifetime.
#[derive(Clone, Debug, Default)]
pub struct AllowList {
    tokens: HashSet<String>,
    sources: Vec<SourceExpression>,
    matching: SourceMatching,
    page_origin: Option<Origin>,
}

impl AllowList {
    /// Collect every token of every network-source directive.
    pub fn from_policy(policy: &str) -> Self {
        let tokens: HashSet<String> = PolicySource::parse_all(policy)
            .into_iter()
            .filter(PolicySource::is_network_source)
            .flat_map(|directive| directive.tokens)
            .collect();
        let sources = tokens.iter().map(|t| SourceExpression::parse(t)).collect();

        Self {
            tokens,
            sources,
            matching: SourceMatching::Literal,
            page_origin: None,
        }
    }

    /// Select the matching mode. `page_origin` backs `'self'`.
    pub fn with_matching(mut self, matching: SourceMatching, page_origin: Option<Origin>) -> Self {
        self.matching = matching;
        self.page_origin = page_origin;
        self
    }

    pub fn matching(&self) -> SourceMatching {
        self.matching
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Whether the allow-list authorizes the target's origin.
    pub fn permits(&self, target: &ResolvedTarget) -> bool {
        if self.tokens.contains(&target.origin()) {
            return true;
        }

        match self.matching {
            SourceMatching::Literal => false,
            SourceMatching::Keywords => self
                .sources
                .iter()
                .any(|source| source.matches(target.url(), self.page_origin.as_ref())),
        }
    }
}

/// Policy in force for one page load.
#[derive(Clone, Debug)]
pub struct PolicyStore {
    policy: String,
    synthesized: bool,
    allow_list: Arc<AllowList>,
}

impl PolicyStore {
    /// Build the allow-list from the declared policy, or synthesize a
    /// same-origin default when nothing is declared.
    pub fn build(
        declared: Option<&str>,
        context: &NavigationContext,
        matching: SourceMatching,
    ) -> Self {
        let declared = declared.map(str::trim).filter(|p| !p.is_empty());
        let (policy, synthesized) = match declared {
            Some(policy) => (policy.to_string(), false),
            None => {
                let policy = Self::default_policy(context.hostname());
                tracing::info!(%policy, "no declared policy, synthesizing default");
                (policy, true)
            }
        };

        let allow_list = AllowList::from_policy(&policy).with_matching(matching, context.page_origin());
        tracing::debug!(
            sources = allow_list.len(),
            ?matching,
            "allow-list built"
        );

        Self {
            policy,
            synthesized,
            allow_list: Arc::new(allow_list),
        }
    }

    /// Same-origin policy granted when a page declares none.
    pub fn default_policy(hostname: &str) -> String {
        format!("default-src 'self' https://{};", hostname)
    }

    /// Policy text in force.
    pub fn policy(&self) -> &str {
        &self.policy
    }

    /// Whether the policy was synthesized and still needs installing on the page.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn allow_list(&self) -> Arc<AllowList> {
        Arc::clone(&self.allow_list)
    }
}
