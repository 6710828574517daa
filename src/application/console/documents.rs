use fieldnotes_relay_types::FileEntry;
use tracing::info;

use super::{AdminConsole, CommitOutcome};
use crate::application::index::{build_index, render_index};
use crate::application::repos::{CommitBatch, CommitError};
use crate::domain::draft::{Draft, DraftField};
use crate::domain::error::DomainError;
use crate::domain::markdown::{draft_from_mirrors, parse_front_matter, render_markdown};
use crate::domain::paths::{INDEX_PATH, document_path};
use crate::domain::slug::generate_unique_slug;
use crate::domain::types::Lang;

impl AdminConsole {
    /// Start a fresh document, discarding any uncommitted draft.
    pub fn new_document(&mut self) -> &Draft {
        let mut draft = Draft::new_at(self.now());
        if let Some(theme) = self.store.themes_in_order().first() {
            draft.theme_id = theme.id.clone();
        }
        self.draft.insert(draft)
    }

    /// Load an existing item into the editor.
    pub fn open_document(&mut self, slug: &str) -> Result<&Draft, DomainError> {
        let item = self
            .store
            .content_by_slug(slug)
            .ok_or_else(|| DomainError::not_found("content item"))?;
        let draft = Draft::open(item);
        Ok(self.draft.insert(draft))
    }

    /// Resume a draft saved by an earlier session.
    pub fn restore_draft(&mut self, draft: Draft) {
        self.draft = Some(draft);
    }

    /// Rebuild the editor state from a pair of committed Markdown mirrors.
    ///
    /// Fields the mirrors do not carry are taken from the indexed item when one
    /// with the same slug exists.
    pub fn import_mirrors(&mut self, en: &str, zh: &str) -> Result<&Draft, DomainError> {
        let en = parse_front_matter(en)?;
        let zh = parse_front_matter(zh)?;
        let mut draft = draft_from_mirrors(&en, &zh)?;
        if let Some(item) = self.store.content_by_slug(&draft.slug) {
            let indexed = Draft::open(item);
            draft.id = indexed.id;
            draft.cover_image = indexed.cover_image;
            draft.co_authors = indexed.co_authors;
            draft.date = indexed.date;
        }
        Ok(self.draft.insert(draft))
    }

    pub fn set_field(&mut self, field: DraftField) -> Result<(), DomainError> {
        let draft = self.active_draft_mut()?;
        draft.set(field);
        Ok(())
    }

    /// Replace the draft slug with one derived from its English title,
    /// avoiding slugs already used by other items.
    pub fn suggest_slug(&mut self) -> Result<String, DomainError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| DomainError::validation("no document is open"))?;
        let source = if draft.title_en.trim().is_empty() {
            draft.title_zh.clone()
        } else {
            draft.title_en.clone()
        };
        let current = draft.slug.clone();
        let store = &self.store;
        let slug = generate_unique_slug(&source, |candidate| {
            candidate == current || store.content_by_slug(candidate).is_none()
        })
        .map_err(|err| DomainError::validation(err.to_string()))?;

        self.active_draft_mut()?.slug = slug.clone();
        Ok(slug)
    }

    fn active_draft_mut(&mut self) -> Result<&mut Draft, DomainError> {
        self.draft
            .as_mut()
            .ok_or_else(|| DomainError::validation("no document is open"))
    }

    /// Commit the active draft: both Markdown mirrors plus the full index.
    ///
    /// Validation happens locally and a rejected draft never reaches the
    /// relay. On success the local snapshot becomes the committed index.
    pub async fn commit(&mut self) -> CommitOutcome {
        let Some(mut draft) = self.draft.clone() else {
            return self.reject("No document is open.".to_string());
        };
        if let Err(err) = draft.validate() {
            return self.reject(err.to_string());
        }

        self.log("Initiating commit sequence...");
        let today = self.now().date();
        let index = build_index(self.store.snapshot(), Some(&draft), today);
        let index_json = match render_index(&index) {
            Ok(json) => json,
            Err(err) => {
                return self.commit_failed(CommitError::Decode(format!(
                    "failed to encode content index: {err}"
                )));
            }
        };

        let files = vec![
            FileEntry::text(
                document_path(draft.content_type, &draft.slug, Lang::Zh),
                render_markdown(&draft, Lang::Zh, today),
            ),
            FileEntry::text(
                document_path(draft.content_type, &draft.slug, Lang::En),
                render_markdown(&draft, Lang::En, today),
            ),
            FileEntry::text(INDEX_PATH, index_json),
        ];
        let batch = CommitBatch::new(
            format!("research(log): {} [web-commit]", draft.title_en),
            files,
        );

        match self.relay.publish(&self.access_key, batch).await {
            Ok(_) => {
                self.store.replace(index);
                draft.date.get_or_insert(today);
                if draft.id.is_empty() {
                    draft.id = draft.slug.clone();
                }
                let slug = draft.slug.clone();
                self.draft = Some(draft);
                info!(target = "fieldnotes::console", slug = %slug, "document committed");
                self.log("Commit accepted.");
                self.log("Done.");
                CommitOutcome::success(format!("Successfully committed: {slug}"))
            }
            Err(err) => self.commit_failed(err),
        }
    }

    fn reject(&mut self, message: String) -> CommitOutcome {
        self.log(format!("Error: {message}"));
        CommitOutcome::failure(message)
    }
}
