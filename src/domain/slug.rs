//! Slug helpers for content identifiers.
//!
//! Slugs double as lookup keys and file-path components, so hand-entered
//! values are checked for URL safety before a commit, and generated values
//! bridge ASCII slugification (`slug` crate) with Chinese transliteration
//! (`pinyin` crate) so a title like “动态稀疏” becomes `dong-tai-xi-shu`.

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use uuid::Uuid;

const MAX_SUFFIX_ATTEMPTS: usize = 32;
const STAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

/// Errors that can occur while generating or checking a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
    #[error("slug `{slug}` may only contain ASCII letters, digits, `-` and `_`")]
    NotUrlSafe { slug: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = transliterate_to_ascii(input);
    let candidate = slugify(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the provided slug is not
/// taken yet. The helper retries by suffixing a counter (`-2`, `-3`, …).
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

/// Placeholder slug for a document created before it has a title.
///
/// The timestamp orders drafts chronologically; the random tail keeps two
/// documents created within the same second apart.
pub fn timestamp_slug(now: OffsetDateTime) -> String {
    let stamp = now
        .format(STAMP_FORMAT)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    let nonce = Uuid::new_v4().simple().to_string();
    format!("entry-{stamp}-{}", &nonce[..6])
}

/// Check that a hand-entered slug can be used verbatim in paths and URLs.
pub fn ensure_url_safe(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::EmptyInput);
    }
    let safe = slug
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !safe || slug.starts_with('-') {
        return Err(SlugError::NotUrlSafe {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => {
                // Preserve unhandled characters so slugify can decide how to filter them.
                output.push(ch);
            }
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}
