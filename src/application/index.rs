//! Builds the aggregate `content.json` document for a commit.

use time::Date;

use crate::domain::draft::Draft;
use crate::domain::entities::{ContentItem, GlobalContentIndex};

/// Replace-or-insert `item` by slug: any existing entry is removed and the new
/// one appended, so repeating the merge never duplicates an item.
pub fn merge_by_slug(mut content: Vec<ContentItem>, item: ContentItem) -> Vec<ContentItem> {
    content.retain(|existing| existing.slug != item.slug);
    content.push(item);
    content
}

/// The full index after applying `draft` on top of `current`.
///
/// Author, themes and speculative notes are always taken from `current`, so the
/// result reflects every local edit, not just the document being saved. A draft
/// with an empty slug is ignored.
pub fn build_index(
    current: &GlobalContentIndex,
    draft: Option<&Draft>,
    commit_date: Date,
) -> GlobalContentIndex {
    let mut index = current.clone();
    if let Some(draft) = draft.filter(|draft| !draft.slug.trim().is_empty()) {
        let content = std::mem::take(&mut index.content);
        index.content = merge_by_slug(content, draft.to_content_item(commit_date));
    }
    index
}

/// Indented JSON exactly as committed to the repository.
pub fn render_index(index: &GlobalContentIndex) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(index)
}
