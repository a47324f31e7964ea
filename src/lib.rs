//! Mock Apollo config service library.

pub mod admin;
pub mod config;
pub mod distribution;
pub mod http;
pub mod lifecycle;
pub mod longpoll;
pub mod observability;
pub mod snapshot;
pub mod source;

pub use config::ServerConfig;
pub use distribution::Distribution;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use source::SourceWatcher;
