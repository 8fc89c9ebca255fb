//! Network policy enforcement primitives.
//!
//! This crate implements the decision side of the page guard:
//! - Origins and the page's navigation context
//! - Resolution of request targets to absolute origins
//! - Declared policy parsing into an allow-list
//! - The per-call egress decision
//! - Violation reports

pub mod origin;
pub mod navigation;
pub mod resolver;
pub mod source;
pub mod policy;
pub mod decision;
pub mod report;

pub use origin::Origin;
pub use navigation::{Location, NavigationContext};
pub use resolver::{resolve, ResolutionError, ResolvedTarget, ResourceDescriptor};
pub use source::SourceExpression;
pub use policy::{AllowList, PolicySource, PolicyStore, SourceMatching};
pub use decision::{decide, Decision};
pub use report::ViolationReport;
