//! Vibe Connector - HTTP boundary for the meme service
//!
//! Wires the request gate in front of the captioner, compositor and
//! image store, and serves the resulting API.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod event_log;
pub mod server;

pub use config::ConnectorConfig;
pub use error::ApiError;
pub use server::{router, AppState, MemeServer};
