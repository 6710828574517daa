//! Content entities mirrored from the published `content.json` index.
//!
//! Every user-facing text is a [`LocalizedString`]; the serialized shape
//! matches the JSON consumed by the public site (camelCase keys, calendar
//! dates as `YYYY-MM-DD`).

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::types::{ContentType, Lang, ResearchStatus};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// A text value carried in both supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedString {
    pub en: String,
    pub zh: String,
}

impl LocalizedString {
    pub fn new(en: impl Into<String>, zh: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            zh: zh.into(),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.en,
            Lang::Zh => &self.zh,
        }
    }

    pub fn get_mut(&mut self, lang: Lang) -> &mut String {
        match lang {
            Lang::En => &mut self.en,
            Lang::Zh => &mut self.zh,
        }
    }
}

/// Optional per-item references. A present field is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_authors: Option<Vec<String>>,
}

impl ContentMetadata {
    /// Build metadata from raw editor values, dropping blank entries.
    ///
    /// Returns `None` when nothing remains so callers omit the whole bag.
    pub fn from_parts(
        journal: &str,
        repo_url: &str,
        tech_stack: Vec<String>,
        notion_url: &str,
        co_authors: Vec<String>,
    ) -> Option<Self> {
        let metadata = Self {
            journal: non_blank(journal),
            repo_url: non_blank(repo_url),
            tech_stack: (!tech_stack.is_empty()).then_some(tech_stack),
            notion_url: non_blank(notion_url),
            co_authors: (!co_authors.is_empty()).then_some(co_authors),
        };
        (!metadata.is_empty()).then_some(metadata)
    }

    pub fn is_empty(&self) -> bool {
        self.journal.is_none()
            && self.repo_url.is_none()
            && self.tech_stack.is_none()
            && self.notion_url.is_none()
            && self.co_authors.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Stable document id shown by the public site; new items use the slug.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: LocalizedString,
    #[serde(rename = "abstract")]
    pub summary: LocalizedString,
    pub content: LocalizedString,
    #[serde(with = "calendar_date")]
    pub date: Date,
    pub theme_id: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ContentMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchTheme {
    pub id: String,
    pub title: LocalizedString,
    pub description: LocalizedString,
    pub hypothesis: LocalizedString,
    #[serde(default)]
    pub status: ResearchStatus,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeculativeItem {
    pub id: String,
    #[serde(with = "calendar_date")]
    pub date: Date,
    pub text: LocalizedString,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeculativeCollection {
    pub title: LocalizedString,
    #[serde(default)]
    pub items: Vec<SpeculativeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Education {
    pub school: LocalizedString,
    pub department: LocalizedString,
    pub major: LocalizedString,
    pub stage: LocalizedString,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: LocalizedString,
    pub role: LocalizedString,
    pub affiliation: LocalizedString,
    pub bio: LocalizedString,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub github: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
}

/// Aggregate root persisted as `public/content.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalContentIndex {
    pub author: Author,
    #[serde(default)]
    pub themes: Vec<ResearchTheme>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub speculative: SpeculativeCollection,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
