//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Inline env document → temp file (first source)
//!     → settings validated → watchers started in order → listeners bound
//!
//! Shutdown (shutdown.rs):
//!     Signal received → pending polls resolve Unchanged → servers drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!     SIGHUP → manual reload of every source (no poll wakeups)
//! ```
//!
//! # Design Decisions
//! - Fail fast: a source that cannot be loaded at startup is fatal
//! - Listeners start last, once every watcher has published

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::spawn_signal_handler;
pub use startup::{materialize_inline_source, InlineSource, StartupError};
