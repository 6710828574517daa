//! Markdown mirrors of content items.
//!
//! Each item is committed as one file per language: a `---` delimited front
//! matter block followed by the raw body. Free-text values are written as
//! YAML double-quoted scalars; tokens (`date`, `type`, `draft`, `lang`) stay
//! bare. The body is appended after a single blank line and never altered,
//! so reading a mirror back yields the exact bytes that were written.

use std::fmt::Write as _;

use time::{Date, format_description::FormatItem, macros::format_description};

use crate::domain::draft::Draft;
use crate::domain::entities::ContentMetadata;
use crate::domain::error::DomainError;
use crate::domain::types::{ContentType, Lang};

const DELIMITER: &str = "---";
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Render the `lang` mirror of `draft`, stamped with `commit_date`.
pub fn render_markdown(draft: &Draft, lang: Lang, commit_date: Date) -> String {
    let mut out = String::with_capacity(draft.content(lang).len() + 512);
    out.push_str(DELIMITER);
    out.push('\n');

    push_quoted(&mut out, "slug", &draft.slug);
    push_quoted(&mut out, "title", draft.title(lang));
    push_quoted(&mut out, "title_en", &draft.title_en);
    push_bare(&mut out, "date", &commit_date.to_string());
    push_bare(&mut out, "type", draft.content_type.as_str());
    push_quoted(&mut out, "theme", &draft.theme_id);
    push_bare(&mut out, "draft", if draft.is_draft { "true" } else { "false" });
    push_bare(&mut out, "lang", lang.as_str());
    push_quoted(&mut out, "abstract", draft.abstract_text(lang));

    if let Some(metadata) = draft.metadata() {
        push_metadata(&mut out, &metadata);
    }

    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(draft.content(lang));
    out
}

/// Escape `value` as the inside of a YAML double-quoted scalar.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn push_quoted(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{key}: {}", quote(value));
}

fn push_bare(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{key}: {value}");
}

fn push_metadata(out: &mut String, metadata: &ContentMetadata) {
    let tech_stack = metadata.tech_stack.as_deref().unwrap_or_default();
    if metadata.journal.is_none()
        && metadata.repo_url.is_none()
        && metadata.notion_url.is_none()
        && tech_stack.is_empty()
    {
        return;
    }

    out.push_str("metadata:\n");
    if let Some(journal) = &metadata.journal {
        let _ = writeln!(out, "  journal: {}", quote(journal));
    }
    if let Some(repo_url) = &metadata.repo_url {
        let _ = writeln!(out, "  repoUrl: {}", quote(repo_url));
    }
    if let Some(notion_url) = &metadata.notion_url {
        let _ = writeln!(out, "  notionUrl: {}", quote(notion_url));
    }
    if !tech_stack.is_empty() {
        let entries: Vec<String> = tech_stack.iter().map(|tag| quote(tag)).collect();
        let _ = writeln!(out, "  techStack: [{}]", entries.join(", "));
    }
}

/// A parsed Markdown mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub slug: String,
    pub title: String,
    pub title_en: String,
    pub date: Date,
    pub content_type: ContentType,
    pub theme: String,
    pub draft: bool,
    pub lang: Lang,
    pub summary: String,
    pub metadata: Option<ContentMetadata>,
    pub body: String,
}

/// Parse a mirror produced by [`render_markdown`].
pub fn parse_front_matter(document: &str) -> Result<MarkdownDocument, DomainError> {
    let rest = document
        .strip_prefix("---\n")
        .ok_or_else(|| DomainError::validation("document does not start with `---`"))?;

    let (header, after) = match rest.find("\n---\n") {
        Some(end) => (&rest[..end], &rest[end + 5..]),
        None => match rest.strip_suffix("\n---") {
            Some(header) => (header, ""),
            None => return Err(DomainError::validation("front matter is not closed")),
        },
    };
    let body = after.strip_prefix('\n').unwrap_or(after);

    let mut builder = FrontMatterBuilder::default();
    let mut in_metadata = false;

    for (number, line) in header.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let nested = line.starts_with("  ");
        let (key, raw) = line
            .trim_start()
            .split_once(':')
            .ok_or_else(|| line_error(number, "expected `key: value`"))?;
        let raw = raw.trim();

        if nested {
            if !in_metadata {
                return Err(line_error(number, "indented key outside `metadata`"));
            }
            builder.metadata_field(key, raw).map_err(|reason| line_error(number, &reason))?;
            continue;
        }

        in_metadata = key == "metadata" && raw.is_empty();
        if !in_metadata {
            builder.field(key, raw).map_err(|reason| line_error(number, &reason))?;
        }
    }

    builder.finish(body)
}

/// Rebuild a [`Draft`] from the English and Chinese mirrors of one item.
///
/// Cover image and co-authors are not part of the mirrors and come back empty.
pub fn draft_from_mirrors(
    en: &MarkdownDocument,
    zh: &MarkdownDocument,
) -> Result<Draft, DomainError> {
    if en.lang != Lang::En || zh.lang != Lang::Zh {
        return Err(DomainError::validation(
            "expected one `lang: en` and one `lang: zh` document",
        ));
    }
    if en.slug != zh.slug {
        return Err(DomainError::validation(format!(
            "mirrors disagree on slug: `{}` vs `{}`",
            en.slug, zh.slug
        )));
    }

    let metadata = en.metadata.clone().unwrap_or_default();
    Ok(Draft {
        slug: en.slug.clone(),
        content_type: en.content_type,
        theme_id: en.theme.clone(),
        is_draft: en.draft,
        date: Some(en.date),
        title_en: en.title.clone(),
        title_zh: zh.title.clone(),
        abstract_en: en.summary.clone(),
        abstract_zh: zh.summary.clone(),
        content_en: en.body.clone(),
        content_zh: zh.body.clone(),
        journal: metadata.journal.unwrap_or_default(),
        repo_url: metadata.repo_url.unwrap_or_default(),
        notion_url: metadata.notion_url.unwrap_or_default(),
        tech_stack: metadata.tech_stack.unwrap_or_default(),
        ..Draft::default()
    })
}

fn line_error(number: usize, reason: &str) -> DomainError {
    DomainError::validation(format!("front matter line {}: {reason}", number + 2))
}

#[derive(Default)]
struct FrontMatterBuilder {
    slug: Option<String>,
    title: Option<String>,
    title_en: Option<String>,
    date: Option<Date>,
    content_type: Option<ContentType>,
    theme: Option<String>,
    draft: Option<bool>,
    lang: Option<Lang>,
    summary: Option<String>,
    metadata: ContentMetadata,
}

impl FrontMatterBuilder {
    fn field(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "slug" => self.slug = Some(scalar(raw)?),
            "title" => self.title = Some(scalar(raw)?),
            "title_en" => self.title_en = Some(scalar(raw)?),
            "theme" => self.theme = Some(scalar(raw)?),
            "abstract" => self.summary = Some(scalar(raw)?),
            "date" => {
                let value = scalar(raw)?;
                self.date = Some(
                    Date::parse(&value, DATE_FORMAT)
                        .map_err(|err| format!("invalid date `{value}`: {err}"))?,
                );
            }
            "type" => {
                self.content_type = Some(scalar(raw)?.parse().map_err(|err| format!("{err}"))?)
            }
            "lang" => self.lang = Some(scalar(raw)?.parse().map_err(|err| format!("{err}"))?),
            "draft" => {
                self.draft = Some(match scalar(raw)?.as_str() {
                    "true" => true,
                    "false" => false,
                    other => return Err(format!("`draft` must be true or false, got `{other}`")),
                })
            }
            // Unknown keys are tolerated so mirrors written by newer tools still load.
            _ => {}
        }
        Ok(())
    }

    fn metadata_field(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "journal" => self.metadata.journal = Some(scalar(raw)?),
            "repoUrl" => self.metadata.repo_url = Some(scalar(raw)?),
            "notionUrl" => self.metadata.notion_url = Some(scalar(raw)?),
            "techStack" => self.metadata.tech_stack = Some(list(raw)?),
            _ => {}
        }
        Ok(())
    }

    fn finish(self, body: &str) -> Result<MarkdownDocument, DomainError> {
        let missing = |key: &str| DomainError::validation(format!("front matter lacks `{key}`"));
        let metadata = self.metadata;
        Ok(MarkdownDocument {
            slug: self.slug.ok_or_else(|| missing("slug"))?,
            title: self.title.ok_or_else(|| missing("title"))?,
            title_en: self.title_en.ok_or_else(|| missing("title_en"))?,
            date: self.date.ok_or_else(|| missing("date"))?,
            content_type: self.content_type.ok_or_else(|| missing("type"))?,
            theme: self.theme.unwrap_or_default(),
            draft: self.draft.unwrap_or(false),
            lang: self.lang.ok_or_else(|| missing("lang"))?,
            summary: self.summary.unwrap_or_default(),
            metadata: (!metadata.is_empty()).then_some(metadata),
            body: body.to_string(),
        })
    }
}

/// A bare token or a complete double-quoted scalar.
fn scalar(raw: &str) -> Result<String, String> {
    if raw.starts_with('"') {
        let (value, rest) = unquote(raw)?;
        if !rest.trim().is_empty() {
            return Err(format!("unexpected text after quoted value: `{rest}`"));
        }
        Ok(value)
    } else {
        Ok(raw.to_string())
    }
}

/// A bracketed list of double-quoted scalars.
fn list(raw: &str) -> Result<Vec<String>, String> {
    let mut rest = raw
        .strip_prefix('[')
        .ok_or_else(|| "expected `[`".to_string())?
        .trim_start();
    let mut items = Vec::new();

    loop {
        if let Some(after) = rest.strip_prefix(']') {
            if !after.trim().is_empty() {
                return Err(format!("unexpected text after list: `{after}`"));
            }
            return Ok(items);
        }
        let (item, after) = unquote(rest)?;
        items.push(item);
        rest = after.trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after.trim_start();
        } else if !rest.starts_with(']') {
            return Err("expected `,` or `]` in list".to_string());
        }
    }
}

/// Decode one double-quoted scalar at the start of `raw`; returns it and the remainder.
fn unquote(raw: &str) -> Result<(String, &str), String> {
    let inner = raw
        .strip_prefix('"')
        .ok_or_else(|| format!("expected a quoted value, got `{raw}`"))?;
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' => return Ok((value, &inner[offset + 1..])),
            '\\' => match chars.next() {
                Some((_, '\\')) => value.push('\\'),
                Some((_, '"')) => value.push('"'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, 't')) => value.push('\t'),
                Some((_, other)) => return Err(format!("unsupported escape `\\{other}`")),
                None => break,
            },
            other => value.push(other),
        }
    }

    Err("unterminated quoted value".to_string())
}
