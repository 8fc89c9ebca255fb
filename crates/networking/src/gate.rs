//! Egress enforcement around a network client.
//!
//! The gate resolves the target, forwards the call to the wrapped client aimed
//! at that resolved URL, and decides afterwards, once the response's own
//! policy header is known. A refused call has therefore already reached the
//! network; refusal only withholds the response from the caller.

use async_trait::async_trait;
use guard_security::{
    decide, resolve, AllowList, Decision, Location, ResolutionError, ResolvedTarget,
    ResourceDescriptor, ViolationReport,
};
use std::sync::Arc;

use crate::client::{ClientError, NetworkClient};
use crate::request::OutboundCall;
use crate::response::Response;

/// Decision for one call, with the target it was made on.
#[derive(Clone, Debug)]
pub struct Assessment {
    pub decision: Decision,
    /// `None` when the descriptor could not be resolved.
    pub target: Option<ResolvedTarget>,
}

/// Wraps a [`NetworkClient`] and enforces the page allow-list.
pub struct EgressGate<C> {
    inner: C,
    allow_list: Arc<AllowList>,
    location: Location,
    policy: Arc<str>,
}

impl<C: NetworkClient> EgressGate<C> {
    pub fn new(inner: C, allow_list: Arc<AllowList>, location: Location) -> Self {
        Self {
            inner,
            allow_list,
            location,
            policy: Arc::from(""),
        }
    }

    /// Policy text quoted in violation reports.
    pub fn with_policy_text(mut self, policy: &str) -> Self {
        self.policy = Arc::from(policy);
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Resolve and decide a call without sending it.
    ///
    /// The navigation context is read from the live location on every call.
    pub fn assess(
        &self,
        descriptor: ResourceDescriptor<'_>,
        response_policy: Option<&str>,
    ) -> Assessment {
        let target = self.resolve_target(descriptor);
        let decision = decide(target.as_ref(), &self.allow_list, response_policy);
        Assessment { decision, target }
    }

    fn resolve_target(&self, descriptor: ResourceDescriptor<'_>) -> Option<ResolvedTarget> {
        let context = self.location.snapshot();
        match resolve(descriptor, &context) {
            Ok(target) => Some(target),
            Err(err @ ResolutionError::InvalidResourceType(_)) => {
                tracing::error!(error = %err, "unresolvable request target");
                None
            }
            Err(err) => {
                tracing::error!(error = %err, "malformed request target");
                None
            }
        }
    }

    /// Send a call through the gate.
    ///
    /// The inner client receives the call aimed at the resolved URL, so the
    /// decision always covers the address actually contacted.
    pub async fn intercept(&self, call: &OutboundCall) -> Result<Response, ClientError> {
        let target = self.resolve_target(call.descriptor());
        let routed = target.as_ref().map(|t| call.routed_to(t.url()));
        let response = self.inner.send(routed.as_ref().unwrap_or(call)).await?;

        let own_policy = response.headers().content_security_policy();
        let decision = decide(target.as_ref(), &self.allow_list, own_policy);

        let href = target
            .as_ref()
            .map(|t| t.href().to_string())
            .unwrap_or_else(|| call.descriptor().display().to_string());

        match decision {
            Decision::PassThrough => {
                tracing::debug!(%href, "allow-listed");
                Ok(response)
            }
            Decision::Forward => {
                tracing::debug!(%href, "excused by response policy");
                Ok(response)
            }
            Decision::InsecureTransport => {
                self.report(&href, decision);
                tracing::error!(%href, "blocked insecure request");
                Err(ClientError::InsecureTransport { href })
            }
            Decision::PolicyViolation => {
                self.report(&href, decision);
                tracing::warn!(%href, "CSP violation blocked");
                Err(ClientError::PolicyViolation { target: href })
            }
        }
    }

    fn report(&self, href: &str, decision: Decision) {
        let report = ViolationReport::new(
            self.location.url().as_str(),
            href,
            self.policy.as_ref(),
            decision,
        );
        tracing::debug!(report = %report.to_report(), "violation report");
    }
}

#[async_trait]
impl<C: NetworkClient> NetworkClient for EgressGate<C> {
    async fn send(&self, call: &OutboundCall) -> Result<Response, ClientError> {
        self.intercept(call).await
    }
}
