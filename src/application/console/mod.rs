//! The admin console: one editing session over the content index.
//!
//! The console owns the local snapshot, the active document draft and the
//! status log. Every operation that talks to the relay returns an outcome
//! value instead of an error and appends what happened to the log.

mod assets;
mod documents;
mod index_edits;

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::application::repos::{CommitError, RelayRepo};
use crate::application::store::ContentStore;
use crate::domain::draft::Draft;
use crate::domain::entities::GlobalContentIndex;
use crate::domain::types::Lang;

/// Result of a relay round trip as presented to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub success: bool,
    pub message: String,
}

impl CommitOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result of an asset upload; `url` is set on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub message: String,
    pub url: Option<String>,
}

impl UploadOutcome {
    fn uploaded(url: String) -> Self {
        Self {
            success: true,
            message: format!("Uploaded: {url}"),
            url: Some(url),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            url: None,
        }
    }
}

pub type Clock = fn() -> OffsetDateTime;

pub struct AdminConsole {
    relay: Arc<dyn RelayRepo>,
    store: ContentStore,
    draft: Option<Draft>,
    lang: Lang,
    access_key: String,
    status_log: Vec<String>,
    clock: Clock,
}

impl AdminConsole {
    pub fn new(relay: Arc<dyn RelayRepo>, index: GlobalContentIndex) -> Self {
        Self {
            relay,
            store: ContentStore::new(index),
            draft: None,
            lang: Lang::En,
            access_key: String::new(),
            status_log: Vec::new(),
            clock: OffsetDateTime::now_utc,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_access_key(mut self, access_key: impl Into<String>) -> Self {
        self.access_key = access_key.into();
        self
    }

    pub fn set_access_key(&mut self, access_key: impl Into<String>) {
        self.access_key = access_key.into();
    }

    /// Language pane that image uploads append to.
    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn set_lang(&mut self, lang: Lang) {
        self.lang = lang;
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn snapshot(&self) -> &GlobalContentIndex {
        self.store.snapshot()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Append-only; never cleared during a session.
    pub fn status_log(&self) -> &[String] {
        &self.status_log
    }

    fn log(&mut self, line: impl Into<String>) {
        self.status_log.push(line.into());
    }

    fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    /// Record a failed relay round trip and turn it into an outcome.
    fn commit_failed(&mut self, error: CommitError) -> CommitOutcome {
        warn!(
            target = "fieldnotes::console",
            kind = error.kind(),
            error = %error,
            "commit failed"
        );
        let message = error.to_string();
        self.log(format!("Error: {message}"));
        CommitOutcome::failure(message)
    }
}
