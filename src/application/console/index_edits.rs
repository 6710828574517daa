//! Edits to entities that live only in the aggregate index.

use fieldnotes_relay_types::FileEntry;
use tracing::info;
use uuid::Uuid;

use super::{AdminConsole, CommitOutcome};
use crate::application::index::render_index;
use crate::application::repos::{CommitBatch, CommitError};
use crate::domain::entities::{
    Author, Education, LocalizedString, ResearchTheme, SpeculativeItem,
};
use crate::domain::error::DomainError;
use crate::domain::paths::INDEX_PATH;
use crate::domain::themes::{MoveDirection, append_theme, move_theme, remove_theme};

impl AdminConsole {
    pub fn add_theme(&mut self, theme: ResearchTheme) -> Result<(), DomainError> {
        append_theme(self.store.themes_mut(), theme)
    }

    pub fn update_theme<F>(&mut self, theme_id: &str, edit: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut ResearchTheme),
    {
        let theme = self
            .store
            .themes_mut()
            .iter_mut()
            .find(|theme| theme.id == theme_id)
            .ok_or_else(|| DomainError::not_found("theme"))?;
        let order = theme.order;
        let id = theme.id.clone();
        edit(theme);
        if theme.id != id || theme.order != order {
            theme.id = id;
            theme.order = order;
            return Err(DomainError::validation(
                "theme id and order change only through add, move and remove",
            ));
        }
        Ok(())
    }

    /// Move the theme shown at `position` (zero based, display order).
    pub fn move_theme(
        &mut self,
        position: usize,
        direction: MoveDirection,
    ) -> Result<bool, DomainError> {
        move_theme(self.store.themes_mut(), position, direction)
    }

    pub fn remove_theme(&mut self, theme_id: &str) -> Result<ResearchTheme, DomainError> {
        remove_theme(self.store.themes_mut(), theme_id)
    }

    /// Add a note at the top of the speculative list, dated today.
    pub fn add_speculative(&mut self, text: LocalizedString) -> &SpeculativeItem {
        let item = SpeculativeItem {
            id: format!("spec-{}", &Uuid::new_v4().simple().to_string()[..8]),
            date: self.now().date(),
            text,
        };
        let items = &mut self.store.speculative_mut().items;
        items.insert(0, item);
        &items[0]
    }

    pub fn update_speculative(
        &mut self,
        id: &str,
        text: LocalizedString,
    ) -> Result<(), DomainError> {
        let item = self
            .store
            .speculative_mut()
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| DomainError::not_found("speculative item"))?;
        item.text = text;
        Ok(())
    }

    pub fn remove_speculative(&mut self, id: &str) -> Result<SpeculativeItem, DomainError> {
        let items = &mut self.store.speculative_mut().items;
        let position = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| DomainError::not_found("speculative item"))?;
        Ok(items.remove(position))
    }

    pub fn set_speculative_title(&mut self, title: LocalizedString) {
        self.store.speculative_mut().title = title;
    }

    pub fn update_author<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut Author),
    {
        edit(self.store.author_mut());
    }

    pub fn add_education(&mut self, entry: Education) {
        self.store.author_mut().education.push(entry);
    }

    pub fn remove_education(&mut self, position: usize) -> Result<Education, DomainError> {
        let education = &mut self.store.author_mut().education;
        if position >= education.len() {
            return Err(DomainError::not_found("education entry"));
        }
        Ok(education.remove(position))
    }

    /// Commit only `public/content.json`, carrying every local edit.
    ///
    /// `what` names the edit in the commit message, e.g. `themes`.
    pub async fn commit_index(&mut self, what: &str) -> CommitOutcome {
        self.log(format!("Syncing index ({what})..."));
        let index = self.store.snapshot().clone();
        let json = match render_index(&index) {
            Ok(json) => json,
            Err(err) => {
                return self.commit_failed(CommitError::Decode(format!(
                    "failed to encode content index: {err}"
                )));
            }
        };
        let batch = CommitBatch::new(
            format!("research(index): {what} [web-commit]"),
            vec![FileEntry::text(INDEX_PATH, json)],
        );

        match self.relay.publish(&self.access_key, batch).await {
            Ok(_) => {
                info!(target = "fieldnotes::console", what = what, "index committed");
                self.log("Index synced.");
                CommitOutcome::success(format!("Index updated: {what}"))
            }
            Err(err) => self.commit_failed(err),
        }
    }
}
