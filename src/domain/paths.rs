//! Repository layout for committed content and uploaded assets.
//!
//! Everything under `public/` is served from the site root, so an asset's
//! public URL is its repository path with that prefix removed.

use std::path::Path;

use crate::domain::error::DomainError;
use crate::domain::types::{ContentType, Lang};

/// Repository path of the aggregate content index.
pub const INDEX_PATH: &str = "public/content.json";

const PUBLIC_ROOT: &str = "public";

/// Repository path of one language mirror of a content item.
pub fn document_path(content_type: ContentType, slug: &str, lang: Lang) -> String {
    format!("content/{}/{slug}.{}.md", content_type.folder(), lang.as_str())
}

/// Where an uploaded binary asset lands and how it is referenced afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetTarget {
    /// Image embedded in a document body.
    ContentImage { slug: String, file_name: String },
    ThemeCover { theme_id: String, extension: String },
    Avatar { extension: String },
    Resume { extension: String },
}

impl AssetTarget {
    /// Target for an image referenced from the body of document `slug`.
    pub fn content_image(slug: &str, original_name: &str) -> Result<Self, DomainError> {
        if slug.trim().is_empty() {
            return Err(DomainError::validation(
                "a slug is required before uploading document images",
            ));
        }
        require_image(original_name)?;
        Ok(Self::ContentImage {
            slug: slug.to_string(),
            file_name: sanitize_file_name(original_name)?,
        })
    }

    pub fn theme_cover(theme_id: &str, original_name: &str) -> Result<Self, DomainError> {
        if theme_id.trim().is_empty() {
            return Err(DomainError::validation("theme id must not be empty"));
        }
        require_image(original_name)?;
        Ok(Self::ThemeCover {
            theme_id: theme_id.to_string(),
            extension: extension_of(original_name)?,
        })
    }

    pub fn avatar(original_name: &str) -> Result<Self, DomainError> {
        require_image(original_name)?;
        Ok(Self::Avatar {
            extension: extension_of(original_name)?,
        })
    }

    pub fn resume(original_name: &str) -> Result<Self, DomainError> {
        Ok(Self::Resume {
            extension: extension_of(original_name)?,
        })
    }

    pub fn repo_path(&self) -> String {
        match self {
            AssetTarget::ContentImage { slug, file_name } => {
                format!("{PUBLIC_ROOT}/images/{slug}/{file_name}")
            }
            AssetTarget::ThemeCover {
                theme_id,
                extension,
            } => format!("{PUBLIC_ROOT}/images/themes/{theme_id}.{extension}"),
            AssetTarget::Avatar { extension } => format!("{PUBLIC_ROOT}/images/profile.{extension}"),
            AssetTarget::Resume { extension } => format!("{PUBLIC_ROOT}/files/resume.{extension}"),
        }
    }

    /// Name shown to readers, e.g. as Markdown image alt text.
    pub fn file_name(&self) -> String {
        let path = self.repo_path();
        path.rsplit('/').next().unwrap_or_default().to_string()
    }

    /// MIME type guessed from the stored file name.
    pub fn media_type(&self) -> String {
        mime_guess::from_path(self.repo_path())
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Singleton assets are overwritten in place and need a cache-busting URL.
    /// Document images keep stable URLs so citations stay reproducible.
    pub fn is_cache_busted(&self) -> bool {
        !matches!(self, AssetTarget::ContentImage { .. })
    }

    /// Public URL after upload; `version` is appended as `?v=` for singleton assets.
    pub fn public_url(&self, version: i128) -> String {
        let base = public_url_for(&self.repo_path());
        if self.is_cache_busted() {
            format!("{base}?v={version}")
        } else {
            base
        }
    }
}

/// Map a repository path under `public/` to the URL the site serves it at.
pub fn public_url_for(repo_path: &str) -> String {
    match repo_path.strip_prefix(PUBLIC_ROOT) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => format!("/{}", repo_path.trim_start_matches('/')),
    }
}

fn sanitize_file_name(original_name: &str) -> Result<String, DomainError> {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base.starts_with('.') {
        return Err(DomainError::validation(format!(
            "`{original_name}` is not a usable file name"
        )));
    }
    Ok(base
        .chars()
        .map(|ch| if ch.is_whitespace() { '-' } else { ch })
        .collect())
}

fn require_image(original_name: &str) -> Result<(), DomainError> {
    let is_image = mime_guess::from_path(original_name)
        .iter()
        .any(|mime| mime.type_() == "image");
    if is_image {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "`{original_name}` is not an image"
        )))
    }
}

fn extension_of(original_name: &str) -> Result<String, DomainError> {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|ch| ch.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            DomainError::validation(format!("`{original_name}` has no usable file extension"))
        })
}
