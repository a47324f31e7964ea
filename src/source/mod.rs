//! Configuration source watching.
//!
//! # Data Flow
//! ```text
//! detector.rs (notify poll loop, or manual)      SourceWatcher::trigger_event
//!         │ SourceEvent::Changed                          │ SourceEvent::Triggered
//!         └──────────────────────┬────────────────────────┘
//!                                ▼
//!                  watcher.rs forwarding task
//!                    → reader.rs (read bytes)
//!                    → snapshot (parse + validate)
//!                    → ArcSwapOption store (atomic publish)
//!                    → events.rs ChangeEvent (rendezvous with one consumer)
//! ```
//!
//! # Design Decisions
//! - A failed load never touches the published snapshot
//! - Manual reloads publish without emitting a change event
//! - Background activities start even if the initial load fails
//! - Change delivery waits for the single consumer to take the event

pub mod detector;
pub mod error;
pub mod events;
pub mod reader;
pub mod watcher;

pub use detector::{ChangeDetector, DetectorHandle, ManualDetector, PollDetector, SourceEvent};
pub use error::LoadError;
pub use events::{change_channel, ChangeEvent, ChangeReceiver, ChangeSender};
pub use reader::{ConfigSource, FileSource, MemorySource};
pub use watcher::{SourceWatcher, MIN_WATCH_INTERVAL};
