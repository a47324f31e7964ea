//! Server settings subsystem.
//!
//! # Data Flow
//! ```text
//! optional settings file (TOML)
//!     → loader.rs (parse & deserialize, defaults for every field)
//!     → CLI flags override individual fields (main.rs)
//!     → validation.rs (semantic checks, all errors collected)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Settings are read once at startup; only configuration sources are watched
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize, parse_config, read_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ServerConfig};
pub use validation::{validate_config, ValidationError};
