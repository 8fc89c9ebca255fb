//! Networking layer for the page guard.
//!
//! This crate handles:
//! - The request/response model seen by page code
//! - The `NetworkClient` seam and its reqwest-backed implementation
//! - Egress enforcement wrapped around any client
//! - The legacy request primitive and transport-identity monitoring

pub mod headers;
pub mod request;
pub mod response;
pub mod client;
pub mod gate;
pub mod legacy;
pub mod monitor;

pub use client::{ClientConfig, ClientError, HttpClient, NetworkClient};
pub use gate::{Assessment, EgressGate};
pub use headers::HeaderMap;
pub use legacy::{ClientSender, LegacyRequest, LegacySender, ReadyState};
pub use monitor::{IdentityCheck, TransportIdentityMonitor};
pub use request::{OutboundCall, Request, RequestOptions, Resource};
pub use response::Response;
