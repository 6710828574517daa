//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    fmt,
    net::SocketAddr,
    num::NonZeroU64,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{BackendArg, CliArgs, Command, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "fieldnotes";
const ENV_PREFIX: &str = "FIELDNOTES";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_MAX_REQUEST_BYTES: u64 = 16 * 1024 * 1024;
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_FILESYSTEM_ROOT: &str = "site";

/// Deployment variable names honoured without the `FIELDNOTES__` prefix.
const ADMIN_KEY_VAR: &str = "ADMIN_KEY";
const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
const GITHUB_OWNER_VAR: &str = "GITHUB_OWNER";
const GITHUB_REPO_VAR: &str = "GITHUB_REPO";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub relay: RelaySettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Github,
    Filesystem,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Github => BackendKind::Github,
            BackendArg::Filesystem => BackendKind::Filesystem,
        }
    }
}

#[derive(Clone)]
pub struct RelaySettings {
    pub backend: BackendKind,
    /// Shared secret expected in `accessKey`; `None` rejects every request.
    pub admin_key: Option<String>,
    pub max_request_bytes: NonZeroU64,
    pub branch: String,
    pub filesystem_root: PathBuf,
    pub github: GitHubSettings,
}

#[derive(Clone)]
pub struct GitHubSettings {
    pub api_base: Url,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
}

impl GitHubSettings {
    /// Owner, repository and token, when all three are present.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.owner.as_deref()?,
            self.repo.as_deref()?,
            self.token.as_deref()?,
        ))
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("backend", &self.backend)
            .field("admin_key", &redacted(&self.admin_key))
            .field("max_request_bytes", &self.max_request_bytes)
            .field("branch", &self.branch)
            .field("filesystem_root", &self.filesystem_root)
            .field("github", &self.github)
            .finish()
    }
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_base", &self.api_base.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &redacted(&self.token))
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_deployment_env(|name| std::env::var(name).ok());

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::CheckConfig) | None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    relay: RawRelaySettings,
}

impl RawSettings {
    /// Fill secrets from the conventional deployment variables unless the
    /// prefixed configuration already provided them.
    fn apply_deployment_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let relay = &mut self.relay;
        if relay.admin_key.is_none() {
            relay.admin_key = lookup(ADMIN_KEY_VAR);
        }
        if relay.github.token.is_none() {
            relay.github.token = lookup(GITHUB_TOKEN_VAR);
        }
        if relay.github.owner.is_none() {
            relay.github.owner = lookup(GITHUB_OWNER_VAR);
        }
        if relay.github.repo.is_none() {
            relay.github.repo = lookup(GITHUB_REPO_VAR);
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(limit) = overrides.relay_max_request_bytes {
            self.relay.max_request_bytes = Some(limit);
        }
        if let Some(backend) = overrides.relay_backend {
            self.relay.backend = Some(backend.into());
        }
        if let Some(branch) = overrides.relay_branch.as_ref() {
            self.relay.branch = Some(branch.clone());
        }
        if let Some(root) = overrides.relay_filesystem_root.as_ref() {
            self.relay.filesystem_root = Some(root.clone());
        }
        if let Some(base) = overrides.github_api_base.as_ref() {
            self.relay.github.api_base = Some(base.clone());
        }
        if let Some(owner) = overrides.github_owner.as_ref() {
            self.relay.github.owner = Some(owner.clone());
        }
        if let Some(repo) = overrides.github_repo.as_ref() {
            self.relay.github.repo = Some(repo.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            relay,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            relay: build_relay_settings(relay)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }
    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_relay_settings(relay: RawRelaySettings) -> Result<RelaySettings, LoadError> {
    let max_request_value = relay.max_request_bytes.unwrap_or(DEFAULT_MAX_REQUEST_BYTES);
    let max_request_bytes = NonZeroU64::new(max_request_value).ok_or_else(|| {
        LoadError::invalid("relay.max_request_bytes", "must be greater than zero")
    })?;
    usize::try_from(max_request_value).map_err(|_| {
        LoadError::invalid(
            "relay.max_request_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    let branch = relay
        .branch
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
    if branch.is_empty() {
        return Err(LoadError::invalid("relay.branch", "must not be empty"));
    }

    let filesystem_root = relay
        .filesystem_root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILESYSTEM_ROOT));
    if filesystem_root.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "relay.filesystem_root",
            "path must not be empty",
        ));
    }

    let api_base_value = relay
        .github
        .api_base
        .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string());
    let api_base = Url::parse(&api_base_value).map_err(|err| {
        LoadError::invalid(
            "relay.github.api_base",
            format!("invalid url `{api_base_value}`: {err}"),
        )
    })?;

    Ok(RelaySettings {
        backend: relay.backend.unwrap_or(BackendKind::Github),
        admin_key: non_blank(relay.admin_key),
        max_request_bytes,
        branch,
        filesystem_root,
        github: GitHubSettings {
            api_base,
            owner: non_blank(relay.github.owner),
            repo: non_blank(relay.github.repo),
            token: non_blank(relay.github.token),
        },
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRelaySettings {
    backend: Option<BackendKind>,
    admin_key: Option<String>,
    max_request_bytes: Option<u64>,
    branch: Option<String>,
    filesystem_root: Option<PathBuf>,
    github: RawGitHubSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGitHubSettings {
    api_base: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    token: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
