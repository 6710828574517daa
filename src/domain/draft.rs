//! The editor's working copy of one content document.
//!
//! A [`Draft`] keeps every bilingual field flattened (`title_en`,
//! `title_zh`, …) because the editor works on one language pane at a time.
//! [`Draft::open`] and [`Draft::to_content_item`] are the only bridges to the
//! nested [`ContentItem`] shape, and both carry every shared field across.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::domain::entities::{ContentItem, ContentMetadata, LocalizedString};
use crate::domain::slug::{SlugError, ensure_url_safe, timestamp_slug};
use crate::domain::types::{ContentType, Lang};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// Local validation failures, raised before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Missing metadata (Slug or Title).")]
    MissingMetadata,
    #[error("invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    /// Index id of the item being edited; empty until first committed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub theme_id: String,
    pub is_draft: bool,
    /// Original publish date; `None` until the document is first committed.
    #[serde(
        with = "calendar_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Date>,
    pub title_en: String,
    pub title_zh: String,
    pub abstract_en: String,
    pub abstract_zh: String,
    pub content_en: String,
    pub content_zh: String,
    pub cover_image: String,
    pub journal: String,
    pub repo_url: String,
    pub notion_url: String,
    pub tech_stack: Vec<String>,
    pub co_authors: Vec<String>,
}

/// A single field replacement applied to a [`Draft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Slug(String),
    ContentType(ContentType),
    ThemeId(String),
    IsDraft(bool),
    Date(Option<Date>),
    Title(Lang, String),
    Abstract(Lang, String),
    Content(Lang, String),
    CoverImage(String),
    Journal(String),
    RepoUrl(String),
    NotionUrl(String),
    /// Comma separated, e.g. `Rust, CUDA`.
    TechStack(String),
    CoAuthors(Vec<String>),
}

impl Draft {
    /// Fresh document with a generated slug, marked as draft.
    pub fn new_at(now: OffsetDateTime) -> Self {
        Self {
            slug: timestamp_slug(now),
            is_draft: true,
            ..Self::default()
        }
    }

    pub fn new() -> Self {
        Self::new_at(OffsetDateTime::now_utc())
    }

    /// Flatten an existing item into an editable buffer.
    pub fn open(item: &ContentItem) -> Self {
        let metadata = item.metadata.clone().unwrap_or_default();
        Self {
            id: item.id.clone(),
            slug: item.slug.clone(),
            content_type: item.content_type,
            theme_id: item.theme_id.clone(),
            is_draft: item.is_draft,
            date: Some(item.date),
            title_en: item.title.en.clone(),
            title_zh: item.title.zh.clone(),
            abstract_en: item.summary.en.clone(),
            abstract_zh: item.summary.zh.clone(),
            content_en: item.content.en.clone(),
            content_zh: item.content.zh.clone(),
            cover_image: item.cover_image.clone().unwrap_or_default(),
            journal: metadata.journal.unwrap_or_default(),
            repo_url: metadata.repo_url.unwrap_or_default(),
            notion_url: metadata.notion_url.unwrap_or_default(),
            tech_stack: metadata.tech_stack.unwrap_or_default(),
            co_authors: metadata.co_authors.unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: DraftField) {
        match field {
            DraftField::Slug(value) => self.slug = value,
            DraftField::ContentType(value) => self.content_type = value,
            DraftField::ThemeId(value) => self.theme_id = value,
            DraftField::IsDraft(value) => self.is_draft = value,
            DraftField::Date(value) => self.date = value,
            DraftField::Title(lang, value) => *self.title_mut(lang) = value,
            DraftField::Abstract(lang, value) => *self.abstract_mut(lang) = value,
            DraftField::Content(lang, value) => *self.content_mut(lang) = value,
            DraftField::CoverImage(value) => self.cover_image = value,
            DraftField::Journal(value) => self.journal = value,
            DraftField::RepoUrl(value) => self.repo_url = value,
            DraftField::NotionUrl(value) => self.notion_url = value,
            DraftField::TechStack(value) => self.tech_stack = split_list(&value),
            DraftField::CoAuthors(value) => {
                self.co_authors = value
                    .into_iter()
                    .map(|entry| entry.trim().to_string())
                    .filter(|entry| !entry.is_empty())
                    .collect();
            }
        }
    }

    pub fn title(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.title_en,
            Lang::Zh => &self.title_zh,
        }
    }

    pub fn abstract_text(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.abstract_en,
            Lang::Zh => &self.abstract_zh,
        }
    }

    pub fn content(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.content_en,
            Lang::Zh => &self.content_zh,
        }
    }

    pub fn title_mut(&mut self, lang: Lang) -> &mut String {
        match lang {
            Lang::En => &mut self.title_en,
            Lang::Zh => &mut self.title_zh,
        }
    }

    pub fn abstract_mut(&mut self, lang: Lang) -> &mut String {
        match lang {
            Lang::En => &mut self.abstract_en,
            Lang::Zh => &mut self.abstract_zh,
        }
    }

    pub fn content_mut(&mut self, lang: Lang) -> &mut String {
        match lang {
            Lang::En => &mut self.content_en,
            Lang::Zh => &mut self.content_zh,
        }
    }

    /// Append a Markdown image reference to the body of `lang`.
    pub fn append_image(&mut self, lang: Lang, alt: &str, url: &str) {
        let body = self.content_mut(lang);
        if !body.is_empty() {
            if !body.ends_with('\n') {
                body.push('\n');
            }
            body.push('\n');
        }
        body.push_str(&format!("![{alt}]({url})"));
    }

    /// Checks required before a commit may leave the machine.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.slug.trim().is_empty() || self.title_en.trim().is_empty() {
            return Err(DraftError::MissingMetadata);
        }
        ensure_url_safe(&self.slug)?;
        Ok(())
    }

    pub fn metadata(&self) -> Option<ContentMetadata> {
        ContentMetadata::from_parts(
            &self.journal,
            &self.repo_url,
            self.tech_stack.clone(),
            &self.notion_url,
            self.co_authors.clone(),
        )
    }

    /// Re-nest the buffer into a [`ContentItem`].
    ///
    /// `commit_date` is used only when the draft has never been published,
    /// and a new item takes its slug as id.
    pub fn to_content_item(&self, commit_date: Date) -> ContentItem {
        let cover = self.cover_image.trim();
        let id = if self.id.is_empty() {
            self.slug.clone()
        } else {
            self.id.clone()
        };
        ContentItem {
            id,
            slug: self.slug.clone(),
            content_type: self.content_type,
            title: LocalizedString::new(&self.title_en, &self.title_zh),
            summary: LocalizedString::new(&self.abstract_en, &self.abstract_zh),
            content: LocalizedString::new(&self.content_en, &self.content_zh),
            date: self.date.unwrap_or(commit_date),
            theme_id: self.theme_id.clone(),
            is_draft: self.is_draft,
            cover_image: (!cover.is_empty()).then(|| cover.to_string()),
            metadata: self.metadata(),
        }
    }
}

/// Split a comma separated editor value, trimming and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn published_item() -> ContentItem {
        ContentItem {
            id: "proj-caba".into(),
            slug: "caba".into(),
            content_type: ContentType::Project,
            title: LocalizedString::new("CABA", "上下文感知位宽"),
            summary: LocalizedString::new("Adaptive bit-width.", "自适应位宽。"),
            content: LocalizedString::new("$$E = mc^2$$", "正文"),
            date: date!(2023 - 11 - 02),
            theme_id: "green-architecture".into(),
            is_draft: false,
            cover_image: Some("/images/caba/cover.png".into()),
            metadata: Some(ContentMetadata {
                journal: None,
                repo_url: Some("https://github.com/kioshiro/caba".into()),
                tech_stack: Some(vec!["CUDA".into(), "PyTorch".into()]),
                notion_url: None,
                co_authors: Some(vec!["Bai, Xinyu".into(), "A. Researcher".into()]),
            }),
        }
    }

    #[test]
    fn open_then_convert_is_lossless() {
        let item = published_item();
        let draft = Draft::open(&item);

        assert_eq!(draft.tech_stack, vec!["CUDA", "PyTorch"]);
        assert_eq!(draft.co_authors, vec!["Bai, Xinyu", "A. Researcher"]);
        assert!(!draft.is_draft);
        assert_eq!(draft.to_content_item(date!(2026 - 01 - 01)), item);
    }

    #[test]
    fn new_items_take_slug_as_id() {
        let mut draft = Draft::new();
        draft.set(DraftField::Slug("fresh".into()));
        assert_eq!(draft.to_content_item(date!(2026 - 10 - 19)).id, "fresh");

        let opened = Draft::open(&published_item());
        assert_eq!(opened.to_content_item(date!(2026 - 10 - 19)).id, "proj-caba");
    }

    #[test]
    fn co_authors_keep_commas_inside_names() {
        let mut draft = Draft::new();
        draft.set(DraftField::CoAuthors(vec![
            " Bai, Xinyu ".into(),
            String::new(),
            "Li, Wei".into(),
        ]));
        let metadata = draft
            .to_content_item(date!(2026 - 10 - 19))
            .metadata
            .expect("metadata");
        assert_eq!(
            metadata.co_authors,
            Some(vec!["Bai, Xinyu".to_string(), "Li, Wei".to_string()])
        );
    }

    #[test]
    fn new_draft_defaults_to_draft_with_generated_slug() {
        let draft = Draft::new_at(datetime!(2026-10-19 08:00:00 UTC));
        assert!(draft.is_draft);
        assert!(draft.slug.starts_with("entry-20261019-080000-"));
        assert_eq!(draft.date, None);
    }

    #[test]
    fn empty_tech_stack_omits_metadata() {
        let mut draft = Draft::new();
        draft.set(DraftField::TechStack(" , ".into()));
        assert_eq!(draft.tech_stack, Vec::<String>::new());
        assert_eq!(draft.to_content_item(date!(2026 - 10 - 19)).metadata, None);

        draft.set(DraftField::TechStack("Rust,  tokio ,".into()));
        let metadata = draft
            .to_content_item(date!(2026 - 10 - 19))
            .metadata
            .expect("metadata");
        assert_eq!(
            metadata.tech_stack,
            Some(vec!["Rust".to_string(), "tokio".to_string()])
        );
    }

    #[test]
    fn validation_requires_slug_and_english_title() {
        let mut draft = Draft::default();
        draft.set(DraftField::Title(Lang::Zh, "测试".into()));
        assert_eq!(draft.validate(), Err(DraftError::MissingMetadata));

        draft.set(DraftField::Slug("test-post".into()));
        assert_eq!(draft.validate(), Err(DraftError::MissingMetadata));

        draft.set(DraftField::Title(Lang::En, "Test".into()));
        assert_eq!(draft.validate(), Ok(()));

        draft.set(DraftField::Slug("test post".into()));
        assert!(matches!(draft.validate(), Err(DraftError::InvalidSlug(_))));
    }

    #[test]
    fn new_items_take_commit_date() {
        let mut draft = Draft::new();
        draft.set(DraftField::Slug("fresh".into()));
        let item = draft.to_content_item(date!(2026 - 10 - 19));
        assert_eq!(item.date, date!(2026 - 10 - 19));
        assert!(item.is_draft);
    }

    #[test]
    fn append_image_separates_paragraphs() {
        let mut draft = Draft::default();
        draft.append_image(Lang::En, "a.png", "/images/p/a.png");
        assert_eq!(draft.content_en, "![a.png](/images/p/a.png)");

        draft.set(DraftField::Content(Lang::Zh, "第一段".into()));
        draft.append_image(Lang::Zh, "b.png", "/images/p/b.png");
        assert_eq!(draft.content_zh, "第一段\n\n![b.png](/images/p/b.png)");
    }

    #[test]
    fn draft_survives_toml_round_trip() {
        let draft = Draft::open(&published_item());
        let encoded = toml::to_string(&draft).expect("encode draft");
        assert!(encoded.contains("type = \"PROJECT\""));
        assert!(encoded.contains("date = \"2023-11-02\""));
        let decoded: Draft = toml::from_str(&encoded).expect("decode draft");
        assert_eq!(decoded, draft);
    }
}
