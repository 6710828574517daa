//! Domain layer types and invariants.

pub mod draft;
pub mod entities;
pub mod error;
pub mod markdown;
pub mod paths;
pub mod slug;
pub mod themes;
pub mod types;
