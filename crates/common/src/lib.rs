//! Common types shared across the pageguard crates.

pub mod error;

pub use error::{GuardError, GuardResult};
