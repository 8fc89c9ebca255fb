//! A guarded page.

use bytes::Bytes;
use common::{GuardError, GuardResult};
use dom::Document;
use guard_security::{Location, PolicyStore};
use networking::{
    ClientError, ClientSender, EgressGate, HttpClient, LegacyRequest, LegacySender, NetworkClient,
    OutboundCall, Response, TransportIdentityMonitor,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use url::Url;

use crate::cloak;
use crate::config::GuardConfig;
use crate::sanitizer::InputSanitizer;

/// A page: its live location and its document.
pub struct Page {
    /// Guard configuration.
    config: GuardConfig,
    /// Current location, shared with every installed client.
    location: Location,
    /// Page document.
    document: RwLock<Document>,
}

impl Page {
    pub fn new(url: Url, document: Document, config: GuardConfig) -> Self {
        Self {
            config,
            location: Location::new(url),
            document: RwLock::new(document),
        }
    }

    /// Page at `url` with an empty document.
    pub fn parse(url: &str, config: GuardConfig) -> GuardResult<Self> {
        Ok(Self::new(Url::parse(url)?, Document::new(), config))
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn url(&self) -> Url {
        self.location.url()
    }

    /// In-page navigation. Installed clients see the new path immediately.
    pub fn navigate(&self, url: Url) {
        tracing::debug!(%url, "navigating");
        self.location.navigate(url);
    }

    pub fn document(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read()
    }

    pub fn document_mut(&self) -> RwLockWriteGuard<'_, Document> {
        self.document.write()
    }

    /// Install the guard: egress enforcement, transport monitoring, input
    /// sanitization, then removal of the marker element.
    pub fn install<C, S>(&self, client: C, sender: S) -> Guard<C>
    where
        C: NetworkClient,
        S: LegacySender + 'static,
    {
        let mut document = self.document.write();

        let declared = self
            .config
            .declared_policy
            .clone()
            .or_else(|| document.declared_policy().map(str::to_string));
        let store = PolicyStore::build(
            declared.as_deref(),
            &self.location.snapshot(),
            self.config.source_matching,
        );
        if store.is_synthesized() {
            document.install_policy(store.policy());
        }
        let gate = EgressGate::new(client, store.allow_list(), self.location.clone())
            .with_policy_text(store.policy());

        let legacy: Box<dyn LegacySender> = if self.config.monitor_transport_identity {
            Box::new(TransportIdentityMonitor::new(sender))
        } else {
            Box::new(sender)
        };

        if self.config.sanitize_inputs {
            document.add_input_hook(Arc::new(InputSanitizer::new()));
        }

        cloak::remove_marker(&mut document, &self.config.marker_id);

        tracing::info!(
            url = %self.location.url(),
            policy = store.policy(),
            synthesized = store.is_synthesized(),
            "guard installed"
        );

        Guard {
            gate,
            legacy,
            policy: store,
        }
    }

    /// Install the guard over a reqwest-backed client built from the config.
    pub fn install_http(&self) -> GuardResult<Guard<HttpClient>> {
        let client = HttpClient::with_config(self.config.client_config())
            .map_err(|e| GuardError::network(e.to_string()))?
            .with_location(self.location.clone());
        let sender = ClientSender::new(client.clone());
        Ok(self.install(client, sender))
    }
}

/// Network primitives of a page with the guard installed.
pub struct Guard<C> {
    gate: EgressGate<C>,
    legacy: Box<dyn LegacySender>,
    policy: PolicyStore,
}

impl<C: NetworkClient> Guard<C> {
    /// The fetch primitive, subject to egress enforcement.
    pub async fn fetch(&self, call: &OutboundCall) -> Result<Response, ClientError> {
        self.gate.send(call).await
    }

    /// The legacy primitive. Not subject to egress enforcement.
    pub async fn send_legacy(
        &self,
        request: &mut LegacyRequest,
        body: Option<Bytes>,
    ) -> Result<(), ClientError> {
        self.legacy.send(request, body).await
    }

    pub fn gate(&self) -> &EgressGate<C> {
        &self.gate
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dom::{Element, EventType, CSP_HTTP_EQUIV};
    use http::{Method, StatusCode};
    use networking::Resource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the requested URL; legacy responses carry a fixed identity marker.
    #[derive(Clone, Default)]
    struct EchoClient {
        calls: Arc<AtomicUsize>,
        marker: Option<&'static str>,
    }

    #[async_trait]
    impl NetworkClient for EchoClient {
        async fn send(&self, call: &OutboundCall) -> Result<Response, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let url = match &call.resource {
                Resource::Request(request) => request.url.clone(),
                Resource::Url(raw) => Url::parse("https://shop.example.com/catalog/list")
                    .unwrap()
                    .join(raw)
                    .unwrap(),
            };
            let mut response = Response::new(StatusCode::OK, url).with_body("ok");
            if let Some(marker) = self.marker {
                response = response.with_header("ssl-cert", marker);
            }
            Ok(response)
        }
    }

    fn page(document: Document, config: GuardConfig) -> Page {
        let url = Url::parse("https://shop.example.com/catalog/list").unwrap();
        Page::new(url, document, config)
    }

    fn install(page: &Page, client: EchoClient) -> Guard<EchoClient> {
        page.install(client.clone(), ClientSender::new(client))
    }

    #[test]
    fn test_install_synthesizes_policy_meta() {
        let page = page(Document::new(), GuardConfig::default());
        let guard = install(&page, EchoClient::default());

        assert!(guard.policy().is_synthesized());
        assert_eq!(
            page.document().declared_policy(),
            Some("default-src 'self' https://shop.example.com;")
        );
        let list = guard.gate().allow_list();
        assert_eq!(list.len(), 2);
        assert!(list.contains("'self'"));
        assert!(list.contains("https://shop.example.com"));
    }

    #[test]
    fn test_install_reads_declared_meta() {
        let mut doc = Document::new();
        doc.install_policy("connect-src https://api.example.com");
        let page = page(doc, GuardConfig::default());

        let guard = install(&page, EchoClient::default());

        assert!(!guard.policy().is_synthesized());
        assert!(guard.gate().allow_list().contains("https://api.example.com"));
        assert_eq!(page.document().elements().count(), 1);
    }

    #[test]
    fn test_configured_policy_overrides_meta() {
        let mut doc = Document::new();
        doc.install_policy("connect-src https://api.example.com");
        let config = GuardConfig::default().with_declared_policy("connect-src https://cfg.example.com");
        let page = page(doc, config);

        let guard = install(&page, EchoClient::default());

        assert_eq!(guard.policy().policy(), "connect-src https://cfg.example.com");
        assert!(!guard.gate().allow_list().contains("https://api.example.com"));
    }

    #[test]
    fn test_install_removes_marker_and_enables_sanitizer() {
        let mut doc = Document::new();
        doc.append_to_body(Element::new("script").with_attribute("id", "pageguard"));
        let field = doc.append_to_body(Element::new("textarea"));
        let page = page(doc, GuardConfig::default());

        install(&page, EchoClient::default());

        let mut doc = page.document_mut();
        assert!(doc.get_element_by_id("pageguard").is_none());
        assert!(doc.meta_http_equiv(CSP_HTTP_EQUIV).is_some());
        doc.input(field, "<b>hi</b>");
        assert_eq!(doc.get(field).unwrap().value(), "bhi/b");
    }

    #[test]
    fn test_sanitizer_can_be_disabled() {
        let mut doc = Document::new();
        let field = doc.append_to_body(Element::new("input"));
        let page = page(doc, GuardConfig::default().with_sanitize_inputs(false));

        install(&page, EchoClient::default());

        let mut doc = page.document_mut();
        doc.input(field, "<b>");
        assert_eq!(doc.get(field).unwrap().value(), "<b>");
    }

    #[tokio::test]
    async fn test_fetch_is_gated() {
        let client = EchoClient::default();
        let page = page(Document::new(), GuardConfig::default());
        let guard = install(&page, client.clone());

        let response = guard.fetch(&OutboundCall::get("./items")).await.unwrap();
        assert_eq!(response.url().as_str(), "https://shop.example.com/catalog/items");

        let err = guard
            .fetch(&OutboundCall::get("https://collector.example.net/beacon"))
            .await
            .unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_follows_navigation() {
        let page = page(Document::new(), GuardConfig::default());
        let guard = install(&page, EchoClient::default());

        page.navigate(Url::parse("https://shop.example.com/account/orders/7").unwrap());

        let assessment = guard
            .gate()
            .assess(OutboundCall::get("./x").descriptor(), None);
        assert_eq!(
            assessment.target.unwrap().href(),
            "https://shop.example.com/account/orders/x"
        );
    }

    fn error_counter(request: &LegacyRequest) -> Arc<AtomicUsize> {
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        request.add_event_listener(EventType::Error, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        errors
    }

    #[tokio::test]
    async fn test_legacy_identity_mismatch_raises_error() {
        let client = EchoClient {
            marker: Some("CN=intercept.example.net"),
            ..EchoClient::default()
        };
        let page = page(Document::new(), GuardConfig::default());
        let guard = install(&page, client);

        let mut request = LegacyRequest::new(
            Method::GET,
            Url::parse("https://shop.example.com/api/cart").unwrap(),
        );
        let errors = error_counter(&request);
        guard.send_legacy(&mut request, None).await.unwrap();

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(request.response_text(), "ok");
    }

    #[tokio::test]
    async fn test_legacy_not_gated_and_monitor_optional() {
        let client = EchoClient {
            marker: Some("CN=intercept.example.net"),
            ..EchoClient::default()
        };
        let page = page(Document::new(), GuardConfig::default().with_transport_monitoring(false));
        let guard = install(&page, client);

        let mut request = LegacyRequest::new(
            Method::GET,
            Url::parse("https://elsewhere.example.org/data").unwrap(),
        );
        let errors = error_counter(&request);
        guard.send_legacy(&mut request, None).await.unwrap();

        assert_eq!(errors.load(Ordering::SeqCst), 0);
        assert_eq!(request.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_install_http() {
        let page = Page::parse("https://shop.example.com/", GuardConfig::default()).unwrap();
        let guard = page.install_http().unwrap();
        assert!(guard.policy().is_synthesized());
    }
}
