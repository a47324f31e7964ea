//! Configuration snapshot subsystem.
//!
//! # Data Flow
//! ```text
//! raw source bytes
//!     → model.rs (YAML/JSON → ConfigSnapshot, nulls normalized)
//!     → validation.rs (acceptance rules, embedded format warnings)
//!     → ConfigSnapshot (immutable, published whole by a SourceWatcher)
//! ```
//!
//! # Design Decisions
//! - A snapshot is never mutated after parsing; a reload builds a new one
//! - Maps are ordered so validation always reports the same first error
//! - Malformed inline yaml/json blobs are warnings, never rejections

pub mod model;
pub mod validation;

pub use model::{ConfigSnapshot, NamespaceConfig};
pub use validation::{validate_snapshot, BlobKind, EmbeddedFormatWarning, ValidationError};
