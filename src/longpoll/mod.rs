//! Long-poll coordination subsystem.
//!
//! # Data Flow
//! ```text
//! GET /notifications/v2
//!     → session.rs (PollSession registers with the registry)
//!     → suspend until: change signal | timeout | caller cancellation
//!     → resolve exactly once, deregister, return PollOutcome
//!
//! SourceWatcher ChangeEvent
//!     → registry.rs forwarding task (one per watcher)
//!     → lock pending set → try_send wakeup to every session → unlock
//! ```
//!
//! # Design Decisions
//! - The registry lock is the only record of who is waiting
//! - Wakeups are buffered per session, so a broadcast never blocks
//! - Any change to any source wakes every pending session
//! - Timeout and cancellation both resolve as `Unchanged`, never as errors

pub mod notification;
pub mod registry;
pub mod session;

pub use notification::{parse_notifications, Notification};
pub use registry::{PollRegistry, Registration, SessionId};
pub use session::{PollOutcome, PollSession, PollState};
