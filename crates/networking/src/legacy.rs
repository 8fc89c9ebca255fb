//! The legacy request primitive (XMLHttpRequest-style).

use async_trait::async_trait;
use bytes::Bytes;
use dom::{Event, EventListeners, EventType};
use http::{Method, StatusCode};
use url::Url;

use crate::client::{ClientError, NetworkClient};
use crate::headers::HeaderMap;
use crate::request::{OutboundCall, Request, RequestOptions};

/// Lifecycle of a legacy request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Unsent,
    Sent,
    Loading,
    Complete,
}

/// One legacy request instance. Observers attach through
/// [`add_event_listener`](Self::add_event_listener).
#[derive(Debug)]
pub struct LegacyRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    state: ReadyState,
    status: Option<StatusCode>,
    response_url: Option<Url>,
    response_headers: HeaderMap,
    response_body: Bytes,
    listeners: EventListeners,
    identity_checked: bool,
}

impl LegacyRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            state: ReadyState::Unsent,
            status: None,
            response_url: None,
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
            listeners: EventListeners::new(),
            identity_checked: false,
        }
    }

    pub fn set_request_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn ready_state(&self) -> ReadyState {
        self.state
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Final URL after redirects; the requested URL until a response arrives.
    pub fn response_url(&self) -> &Url {
        self.response_url.as_ref().unwrap_or(&self.url)
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn get_response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name)
    }

    pub fn response_text(&self) -> String {
        String::from_utf8_lossy(&self.response_body).into_owned()
    }

    pub fn add_event_listener(
        &self,
        event_type: EventType,
        listener: impl Fn(&Event) + Send + Sync + 'static,
    ) {
        self.listeners.add(event_type, listener);
    }

    pub fn dispatch_event(&self, event: &Event) -> usize {
        self.listeners.dispatch(event)
    }

    fn transition(&mut self, state: ReadyState) {
        self.state = state;
        self.dispatch_event(&Event::new(EventType::ReadyStateChange).trusted());
    }

    /// Marks the request as inspected. Returns `false` if it already was.
    pub(crate) fn claim_identity_check(&mut self) -> bool {
        !std::mem::replace(&mut self.identity_checked, true)
    }

    fn to_call(&self, body: Option<Bytes>) -> OutboundCall {
        let mut request = Request::new(self.method.clone(), self.url.clone());
        request.headers = self.headers.clone();
        request.body = body;
        OutboundCall::new(request, RequestOptions::default())
    }
}

/// The `send` operation of the legacy primitive.
#[async_trait]
pub trait LegacySender: Send + Sync {
    /// Drive `request` to completion. Listeners observe every state change.
    async fn send(&self, request: &mut LegacyRequest, body: Option<Bytes>) -> Result<(), ClientError>;
}

/// Sends legacy requests over a [`NetworkClient`].
pub struct ClientSender<C> {
    client: C,
}

impl<C: NetworkClient> ClientSender<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: NetworkClient> LegacySender for ClientSender<C> {
    async fn send(&self, request: &mut LegacyRequest, body: Option<Bytes>) -> Result<(), ClientError> {
        if request.state != ReadyState::Unsent {
            return Err(ClientError::Request("request already sent".to_string()));
        }

        let call = request.to_call(body);
        request.transition(ReadyState::Sent);

        match self.client.send(&call).await {
            Ok(response) => {
                request.status = Some(response.status());
                request.response_url = Some(response.url().clone());
                request.response_headers = response.headers().clone();
                request.transition(ReadyState::Loading);
                request.response_body = response.bytes().clone();
                request.transition(ReadyState::Complete);
                request.dispatch_event(&Event::new(EventType::Load).trusted());
                Ok(())
            }
            Err(err) => {
                request.transition(ReadyState::Complete);
                request.dispatch_event(&Event::error(err.to_string()).trusted());
                Err(err)
            }
        }
    }
}
