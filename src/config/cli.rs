use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the relay binary.
#[derive(Debug, Parser)]
#[command(
    name = "fieldnotes",
    version,
    about = "Repository commit relay for the research log"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "FIELDNOTES_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the relay HTTP service.
    Serve(Box<ServeArgs>),
    /// Print the resolved configuration with secrets redacted.
    #[command(name = "check-config")]
    CheckConfig,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Github,
    Filesystem,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the maximum publish request size in bytes.
    #[arg(long = "relay-max-request-bytes", value_name = "BYTES")]
    pub relay_max_request_bytes: Option<u64>,

    /// Select where committed files are written.
    #[arg(long = "relay-backend", value_name = "BACKEND", value_enum)]
    pub relay_backend: Option<BackendArg>,

    /// Override the target branch.
    #[arg(long = "relay-branch", value_name = "BRANCH")]
    pub relay_branch: Option<String>,

    /// Override the root directory of the filesystem backend.
    #[arg(
        long = "relay-filesystem-root",
        value_name = "PATH",
        value_hint = ValueHint::DirPath
    )]
    pub relay_filesystem_root: Option<PathBuf>,

    /// Override the GitHub API base URL.
    #[arg(long = "github-api-base", value_name = "URL")]
    pub github_api_base: Option<String>,

    /// Override the repository owner.
    #[arg(long = "github-owner", value_name = "OWNER")]
    pub github_owner: Option<String>,

    /// Override the repository name.
    #[arg(long = "github-repo", value_name = "REPO")]
    pub github_repo: Option<String>,
}
