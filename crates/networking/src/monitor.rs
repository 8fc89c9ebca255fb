//! Transport-identity monitoring for legacy requests.
//!
//! Some servers echo their certificate subject in a response header. The
//! monitor compares that marker with the host that actually answered and
//! raises an `error` event on the request when they disagree. It never
//! alters the request's own outcome.

use async_trait::async_trait;
use bytes::Bytes;
use dom::Event;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::client::ClientError;
use crate::legacy::{LegacyRequest, LegacySender, ReadyState};

/// Result of inspecting one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityCheck {
    /// Request has not completed; nothing inspected.
    Pending,
    /// Request was inspected before.
    AlreadyChecked,
    /// Response carried no marker.
    NoMarker,
    Match,
    Mismatch { host: String },
}

/// Decorates a [`LegacySender`] with the identity check.
pub struct TransportIdentityMonitor<S> {
    inner: S,
    mismatches: AtomicUsize,
}

impl<S: LegacySender> TransportIdentityMonitor<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mismatches: AtomicUsize::new(0),
        }
    }

    /// Mismatches reported so far.
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.load(Ordering::Relaxed)
    }

    /// Inspect a request. Acts once per request, and only when complete.
    pub fn inspect(&self, request: &mut LegacyRequest) -> IdentityCheck {
        if request.ready_state() != ReadyState::Complete {
            return IdentityCheck::Pending;
        }
        if !request.claim_identity_check() {
            return IdentityCheck::AlreadyChecked;
        }

        let host = request.response_url().host_str().unwrap_or("").to_string();
        let Some(marker) = request.response_headers().transport_identity() else {
            return IdentityCheck::NoMarker;
        };

        if marker.contains(&host) {
            tracing::debug!(%host, "transport identity matches");
            return IdentityCheck::Match;
        }

        tracing::error!(%host, marker, "Certificate mismatch for {}", host);
        self.mismatches.fetch_add(1, Ordering::Relaxed);
        request.dispatch_event(&Event::error(format!("Certificate mismatch for {}", host)));
        IdentityCheck::Mismatch { host }
    }
}

#[async_trait]
impl<S: LegacySender> LegacySender for TransportIdentityMonitor<S> {
    async fn send(&self, request: &mut LegacyRequest, body: Option<Bytes>) -> Result<(), ClientError> {
        let result = self.inner.send(request, body).await;
        self.inspect(request);
        result
    }
}
