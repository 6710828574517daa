//! Command-line surface for `fieldnotes-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fieldnotes::domain::themes::MoveDirection;
use fieldnotes::domain::types::{Lang, ResearchStatus};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fieldnotes-cli",
    version,
    about = "Edit the research log and commit it through the relay",
    long_about = None
)]
pub struct Cli {
    /// Relay base URL, e.g. <https://example.com>
    #[arg(long, env = "FIELDNOTES_RELAY_URL")]
    pub relay: Option<String>,

    /// Path to file containing the access key (takes precedence over env)
    #[arg(long, env = "FIELDNOTES_ACCESS_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Access key from env (CLI flag intentionally disabled to avoid shell history leaks)
    #[arg(hide = true, env = "FIELDNOTES_ACCESS_KEY")]
    pub access_key_env: Option<String>,

    /// Local copy of the published content index
    #[arg(long, env = "FIELDNOTES_INDEX", default_value = "public/content.json")]
    pub index: PathBuf,

    /// Where the working draft is kept between invocations
    #[arg(long, env = "FIELDNOTES_DRAFT", default_value = ".fieldnotes/draft.toml")]
    pub draft: PathBuf,

    /// Language pane for localized edits and image references
    #[arg(long, global = true, value_enum, default_value_t = LangArg::En)]
    pub lang: LangArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Working draft management
    Draft(DraftArgs),
    /// Commit the working draft: both Markdown mirrors plus the index
    Commit,
    /// Binary asset uploads
    Upload(UploadArgs),
    /// Research theme editing (commits the index)
    Themes(ThemesArgs),
    /// Speculative notes (commits the index)
    Speculative(SpeculativeArgs),
    /// Author profile (commits the index)
    Profile(ProfileArgs),
    /// List indexed content, newest first
    List {
        /// Only items belonging to this theme
        #[arg(long)]
        theme: Option<String>,
        /// Hide items still marked as drafts
        #[arg(long, default_value_t = false)]
        public: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LangArg {
    En,
    Zh,
}

impl From<LangArg> for Lang {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Lang::En,
            LangArg::Zh => Lang::Zh,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub action: DraftCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCmd {
    /// Start a new document with a timestamp slug
    New,
    /// Load an indexed item by slug
    Open { slug: String },
    /// Rebuild the draft from a pair of committed Markdown mirrors
    Import {
        #[arg(long)]
        en: PathBuf,
        #[arg(long)]
        zh: PathBuf,
    },
    /// Set one field; localized fields use --lang
    Set {
        #[arg(value_enum)]
        field: DraftFieldArg,
        value: Option<String>,
        #[arg(long)]
        value_file: Option<PathBuf>,
    },
    /// Derive the slug from the title, avoiding slugs already in use
    SuggestSlug,
    /// Print the working draft
    Show,
    /// Print the Markdown mirror that a commit would write
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DraftFieldArg {
    Slug,
    Type,
    Theme,
    Draft,
    Date,
    Title,
    Abstract,
    Content,
    Cover,
    Journal,
    RepoUrl,
    NotionUrl,
    /// Comma separated
    TechStack,
    /// One name per line, so names may contain commas
    CoAuthors,
}

#[derive(Parser, Debug, Clone)]
pub struct UploadArgs {
    #[command(subcommand)]
    pub action: UploadCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UploadCmd {
    /// Image for the working draft; referenced at the end of the --lang body
    Image { path: PathBuf },
    /// Profile photo
    Avatar { path: PathBuf },
    /// Résumé document
    Resume { path: PathBuf },
    /// Cover image of a research theme
    ThemeCover { theme: String, path: PathBuf },
}

#[derive(Parser, Debug, Clone)]
pub struct ThemesArgs {
    #[command(subcommand)]
    pub action: ThemesCmd,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ThemeText {
    #[arg(long)]
    pub title_en: Option<String>,
    #[arg(long)]
    pub title_zh: Option<String>,
    #[arg(long)]
    pub description_en: Option<String>,
    #[arg(long)]
    pub description_zh: Option<String>,
    #[arg(long)]
    pub hypothesis_en: Option<String>,
    #[arg(long)]
    pub hypothesis_zh: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemesCmd {
    /// Themes in display order
    List,
    /// Append a theme at the end of the display order
    Add {
        id: String,
        #[command(flatten)]
        text: ThemeText,
    },
    /// Change text fields or status of a theme
    Update {
        id: String,
        #[command(flatten)]
        text: ThemeText,
    },
    /// Swap a theme with its neighbour
    Move {
        id: String,
        #[arg(value_enum)]
        direction: DirectionArg,
    },
    /// Delete a theme and close the gap in the ordering
    Remove { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Exploring,
    Active,
    Stabilizing,
    Archived,
}

impl From<StatusArg> for ResearchStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Exploring => ResearchStatus::Exploring,
            StatusArg::Active => ResearchStatus::Active,
            StatusArg::Stabilizing => ResearchStatus::Stabilizing,
            StatusArg::Archived => ResearchStatus::Archived,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for MoveDirection {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Up => MoveDirection::Up,
            DirectionArg::Down => MoveDirection::Down,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SpeculativeArgs {
    #[command(subcommand)]
    pub action: SpeculativeCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SpeculativeCmd {
    /// Add a note at the top of the list, dated today
    Add {
        #[arg(long)]
        en: String,
        #[arg(long)]
        zh: String,
    },
    /// Replace the text of a note
    Update {
        id: String,
        #[arg(long)]
        en: String,
        #[arg(long)]
        zh: String,
    },
    /// Delete a note
    Remove { id: String },
    /// Rename the collection
    Title {
        #[arg(long)]
        en: String,
        #[arg(long)]
        zh: String,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCmd {
    /// Print the author profile
    Show,
    /// Set one field; localized fields use --lang
    Set {
        #[arg(value_enum)]
        field: ProfileFieldArg,
        value: String,
    },
    /// Append an education entry
    AddEducation {
        #[arg(long)]
        school_en: String,
        #[arg(long)]
        school_zh: String,
        #[arg(long, default_value = "")]
        department_en: String,
        #[arg(long, default_value = "")]
        department_zh: String,
        #[arg(long, default_value = "")]
        major_en: String,
        #[arg(long, default_value = "")]
        major_zh: String,
        #[arg(long, default_value = "")]
        stage_en: String,
        #[arg(long, default_value = "")]
        stage_zh: String,
    },
    /// Remove the education entry at a zero-based position
    RemoveEducation { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileFieldArg {
    Name,
    Role,
    Affiliation,
    Bio,
    Email,
    Github,
    Scholar,
}
