//! pageguard - client-side request interception and policy enforcement.
//!
//! This crate wires the guard components onto a page:
//! - Egress enforcement against the declared (or synthesized) policy
//! - Transport-identity monitoring of legacy requests
//! - Input sanitization of editable fields
//! - Removal of the guard's own marker element

pub mod config;
pub mod sanitizer;
pub mod cloak;
pub mod page;

pub use config::GuardConfig;
pub use page::{Guard, Page};
pub use sanitizer::{sanitize, InputSanitizer};

/// Guard version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
