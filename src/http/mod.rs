//! Public config API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → handlers.rs
//!         /configs, /configfiles → Distribution::query → projection
//!         /notifications/v2      → Distribution::long_poll (held open)
//!         /services/config       → static service descriptor
//!     → response.rs (Apollo wire shapes)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, NotificationsQuery, X_REQUEST_ID};
pub use response::{ConfigResponse, ServiceInstance};
pub use server::{build_router, serve, AppState, HttpServer};
