#![deny(clippy::all, clippy::pedantic)]

pub mod assets;
pub mod documents;
pub mod index;
pub mod list;
