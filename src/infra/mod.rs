//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod filesystem;
pub mod github;
pub mod http;
pub mod relay_client;
pub mod telemetry;
