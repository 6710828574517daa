//! Application services: the admin console, the relay and the index builder.

pub mod console;
pub mod error;
pub mod index;
pub mod relay;
pub mod repos;
pub mod store;
