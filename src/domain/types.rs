//! Shared domain enumerations aligned with the persisted content index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Languages every user-facing text field is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Zh,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Zh];

    pub fn as_str(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Zh => "zh",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "en" => Ok(Lang::En),
            "zh" => Ok(Lang::Zh),
            other => Err(DomainError::validation(format!(
                "unknown language `{other}`"
            ))),
        }
    }
}

/// Discriminates the display layout of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    #[default]
    Article,
    Project,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Article => "ARTICLE",
            ContentType::Project => "PROJECT",
        }
    }

    /// Directory below `content/` holding the Markdown mirrors of this type.
    pub fn folder(self) -> &'static str {
        match self {
            ContentType::Article => "articles",
            ContentType::Project => "projects",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "ARTICLE" => Ok(ContentType::Article),
            "PROJECT" => Ok(ContentType::Project),
            _ => Err(DomainError::validation(format!(
                "unknown content type `{value}`"
            ))),
        }
    }
}

/// Lifecycle label of a research theme. Transitions are unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResearchStatus {
    #[default]
    Exploring,
    Active,
    Stabilizing,
    Archived,
}

impl ResearchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResearchStatus::Exploring => "Exploring",
            ResearchStatus::Active => "Active",
            ResearchStatus::Stabilizing => "Stabilizing",
            ResearchStatus::Archived => "Archived",
        }
    }
}

impl FromStr for ResearchStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "exploring" => Ok(ResearchStatus::Exploring),
            "active" => Ok(ResearchStatus::Active),
            "stabilizing" => Ok(ResearchStatus::Stabilizing),
            "archived" => Ok(ResearchStatus::Archived),
            _ => Err(DomainError::validation(format!(
                "unknown research status `{value}`"
            ))),
        }
    }
}
