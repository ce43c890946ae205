//! # bd-infra
//!
//! Infrastructure adapters for the bizdesk client: the reqwest-based file
//! transport, the filesystem media source and environment configuration.
//! Each adapter implements a port from `bd-core`.

pub mod config;
pub mod fs;
pub mod http;

pub use config::ApiConfig;
pub use fs::FsMediaSource;
pub use http::HttpFileTransport;
