#![deny(clippy::all, clippy::pedantic)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fieldnotes::application::console::{AdminConsole, CommitOutcome, UploadOutcome};
use fieldnotes::application::index::render_index;
use fieldnotes::application::repos::{CommitBatch, CommitError, RelayRepo};
use fieldnotes::domain::draft::Draft;
use fieldnotes::domain::entities::GlobalContentIndex;
use fieldnotes::domain::error::DomainError;
use fieldnotes::infra::error::InfraError;
use fieldnotes::infra::relay_client::HttpRelayClient;
use thiserror::Error;

use crate::args::Cli;
use crate::io::write_file;
use crate::print::{print_json, print_status_log};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("relay URL is required (use --relay or FIELDNOTES_RELAY_URL)")]
    MissingRelay,
    #[error("access key is required (use --key-file or FIELDNOTES_ACCESS_KEY)")]
    MissingKey,
    #[error("failed to read key file: {0}")]
    KeyFile(std::io::Error),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    OutputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("content index {path} is invalid: {reason}")]
    Index { path: String, reason: String },
    #[error("draft file {path} is invalid: {reason}")]
    DraftFile { path: String, reason: String },
    #[error("no working draft (run `draft new` or `draft open <slug>` first)")]
    NoDraft,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("{0}")]
    Rejected(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Stand-in relay for commands that never leave the machine.
struct Offline;

#[async_trait]
impl RelayRepo for Offline {
    async fn publish(&self, _access_key: &str, _batch: CommitBatch) -> Result<String, CommitError> {
        Err(CommitError::Configuration(CliError::MissingRelay.to_string()))
    }
}

/// One CLI invocation's view of the console plus where its state lives on disk.
pub struct Session {
    pub console: AdminConsole,
    index_path: PathBuf,
    draft_path: PathBuf,
    printed: Cell<usize>,
}

impl Session {
    fn open(cli: &Cli, relay: Arc<dyn RelayRepo>, key: String) -> Result<Self, CliError> {
        let index = load_index(&cli.index)?;
        let mut console = AdminConsole::new(relay, index).with_access_key(key);
        console.set_lang(cli.lang.into());
        if let Some(draft) = load_draft(&cli.draft)? {
            console.restore_draft(draft);
        }
        Ok(Self {
            console,
            index_path: cli.index.clone(),
            draft_path: cli.draft.clone(),
            printed: Cell::new(0),
        })
    }

    pub fn draft(&self) -> Result<&Draft, CliError> {
        self.console.draft().ok_or(CliError::NoDraft)
    }

    pub fn save_index(&self) -> Result<(), CliError> {
        let json = render_index(self.console.snapshot())
            .map_err(|e| CliError::InvalidInput(e.to_string()))?;
        write_file(&self.index_path, json.as_bytes())
    }

    pub fn save_draft(&self) -> Result<(), CliError> {
        let draft = self.draft()?;
        let toml = toml::to_string(draft).map_err(|e| CliError::DraftFile {
            path: self.draft_path.display().to_string(),
            reason: e.to_string(),
        })?;
        write_file(&self.draft_path, toml.as_bytes())
    }

    fn flush_log(&self) {
        let lines = self.console.status_log();
        print_status_log(&lines[self.printed.get()..]);
        self.printed.set(lines.len());
    }

    /// Print new status lines and the outcome; a failed outcome becomes an error.
    pub fn report(&self, outcome: &CommitOutcome) -> Result<(), CliError> {
        self.flush_log();
        print_json(outcome)?;
        if outcome.success {
            Ok(())
        } else {
            Err(CliError::Rejected(outcome.message.clone()))
        }
    }

    pub fn report_upload(&self, outcome: &UploadOutcome) -> Result<(), CliError> {
        self.flush_log();
        print_json(outcome)?;
        if outcome.success {
            Ok(())
        } else {
            Err(CliError::Rejected(outcome.message.clone()))
        }
    }
}

/// Session for commands that talk to the relay.
pub fn connect(cli: &Cli) -> Result<Session, CliError> {
    let relay_url = cli.relay.clone().ok_or(CliError::MissingRelay)?;
    let key = read_key(cli)?;
    let relay = HttpRelayClient::new(&relay_url)?;
    Session::open(cli, Arc::new(relay), key)
}

/// Session for commands that only touch local files.
pub fn offline(cli: &Cli) -> Result<Session, CliError> {
    Session::open(cli, Arc::new(Offline), String::new())
}

pub(crate) fn read_key(cli: &Cli) -> Result<String, CliError> {
    if let Some(path) = &cli.key_file {
        Ok(fs::read_to_string(path)
            .map_err(CliError::KeyFile)?
            .trim()
            .to_string())
    } else {
        cli.access_key_env.clone().ok_or(CliError::MissingKey)
    }
}

fn load_index(path: &Path) -> Result<GlobalContentIndex, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::InputFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| CliError::Index {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_draft(path: &Path) -> Result<Option<Draft>, CliError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CliError::InputFile {
                path: path.display().to_string(),
                source,
            });
        }
    };
    toml::from_str(&raw)
        .map(Some)
        .map_err(|e| CliError::DraftFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
