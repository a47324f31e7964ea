//! Distribution subsystem: the read and subscribe surface of the server.
//!
//! # Data Flow
//! ```text
//! (app, cluster, namespace token)
//!     → namespace.rs (strip extension → canonical id + ConfigFormat)
//!     → facade.rs (first registered watcher holding the triple wins)
//!     → projection.rs (NamespaceConfig → Configurations for the format)
//!
//! notifications request
//!     → facade.rs long_poll → longpoll::PollSession on the shared registry
//! ```
//!
//! # Design Decisions
//! - Watchers are consulted in registration order, so overlapping sources
//!   resolve deterministically
//! - Missing namespaces and unknown formats are read outcomes, not faults of
//!   the watch machinery

pub mod error;
pub mod facade;
pub mod namespace;
pub mod projection;

pub use error::DistributionError;
pub use facade::{Distribution, NamespaceQuery, ReloadReport, SourceStatus};
pub use namespace::{parse_namespace, ConfigFormat};
pub use projection::{project, Configurations};
