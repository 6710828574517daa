//! In-memory content snapshot and the read queries the public site runs on it.

use std::cmp::Reverse;

use crate::domain::entities::{
    Author, ContentItem, GlobalContentIndex, ResearchTheme, SpeculativeCollection,
};

/// Holds the latest known [`GlobalContentIndex`].
///
/// The console replaces the snapshot wholesale after a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentStore {
    index: GlobalContentIndex,
}

impl ContentStore {
    pub fn new(index: GlobalContentIndex) -> Self {
        Self { index }
    }

    pub fn snapshot(&self) -> &GlobalContentIndex {
        &self.index
    }

    pub fn replace(&mut self, index: GlobalContentIndex) {
        self.index = index;
    }

    pub fn author(&self) -> &Author {
        &self.index.author
    }

    pub fn themes(&self) -> &[ResearchTheme] {
        &self.index.themes
    }

    pub fn speculative(&self) -> &SpeculativeCollection {
        &self.index.speculative
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.index.content
    }

    pub fn author_mut(&mut self) -> &mut Author {
        &mut self.index.author
    }

    pub fn themes_mut(&mut self) -> &mut Vec<ResearchTheme> {
        &mut self.index.themes
    }

    pub fn speculative_mut(&mut self) -> &mut SpeculativeCollection {
        &mut self.index.speculative
    }

    /// Themes sorted by their display `order`.
    pub fn themes_in_order(&self) -> Vec<&ResearchTheme> {
        let mut themes: Vec<&ResearchTheme> = self.index.themes.iter().collect();
        themes.sort_by_key(|theme| theme.order);
        themes
    }

    pub fn theme(&self, id: &str) -> Option<&ResearchTheme> {
        self.index.themes.iter().find(|theme| theme.id == id)
    }

    /// Every item, newest first. Items sharing a date keep index order.
    pub fn all_content(&self) -> Vec<&ContentItem> {
        let mut items: Vec<&ContentItem> = self.index.content.iter().collect();
        items.sort_by_key(|item| Reverse(item.date));
        items
    }

    pub fn content_by_slug(&self, slug: &str) -> Option<&ContentItem> {
        self.index.content.iter().find(|item| item.slug == slug)
    }

    pub fn content_by_theme(&self, theme_id: &str) -> Vec<&ContentItem> {
        self.all_content()
            .into_iter()
            .filter(|item| item.theme_id == theme_id)
            .collect()
    }

    /// The index as the public site should see it: drafts removed.
    pub fn public_index(&self) -> GlobalContentIndex {
        let mut index = self.index.clone();
        index.content.retain(|item| !item.is_draft);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LocalizedString;
    use crate::domain::types::{ContentType, ResearchStatus};
    use time::Date;
    use time::macros::date;

    fn item(slug: &str, theme: &str, date: Date, is_draft: bool) -> ContentItem {
        ContentItem {
            id: slug.into(),
            slug: slug.into(),
            content_type: ContentType::Article,
            title: LocalizedString::new(slug, slug),
            summary: LocalizedString::default(),
            content: LocalizedString::default(),
            date,
            theme_id: theme.into(),
            is_draft,
            cover_image: None,
            metadata: None,
        }
    }

    fn theme(id: &str, order: u32) -> ResearchTheme {
        ResearchTheme {
            id: id.into(),
            title: LocalizedString::new(id, id),
            description: LocalizedString::default(),
            hypothesis: LocalizedString::default(),
            status: ResearchStatus::Active,
            order,
            cover_image: None,
        }
    }

    fn store() -> ContentStore {
        ContentStore::new(GlobalContentIndex {
            themes: vec![theme("b", 2), theme("a", 1)],
            content: vec![
                item("old", "a", date!(2023 - 01 - 10), false),
                item("new", "b", date!(2024 - 06 - 01), false),
                item("hidden", "a", date!(2024 - 07 - 01), true),
            ],
            ..GlobalContentIndex::default()
        })
    }

    #[test]
    fn content_is_listed_newest_first() {
        let store = store();
        let slugs: Vec<&str> = store.all_content().iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["hidden", "new", "old"]);

        let by_theme: Vec<&str> = store
            .content_by_theme("a")
            .iter()
            .map(|i| i.slug.as_str())
            .collect();
        assert_eq!(by_theme, vec!["hidden", "old"]);
    }

    #[test]
    fn themes_follow_display_order() {
        let store = store();
        let ids: Vec<&str> = store.themes_in_order().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.theme("b").is_some());
    }

    #[test]
    fn public_index_excludes_drafts() {
        let store = store();
        let public = store.public_index();
        assert_eq!(public.content.len(), 2);
        assert!(public.content.iter().all(|item| !item.is_draft));
        assert!(store.content_by_slug("hidden").is_some());
    }
}
