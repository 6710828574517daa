//! Bilingual research-log content pipeline.
//!
//! Drafts are edited through the [`application::console::AdminConsole`],
//! rendered into Markdown mirrors plus a JSON content index, and committed as
//! one batch through the repository relay served by the `fieldnotes` binary.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
