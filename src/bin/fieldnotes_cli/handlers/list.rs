#![deny(clippy::all, clippy::pedantic)]

use fieldnotes::application::store::ContentStore;
use serde::Serialize;

use crate::args::Cli;
use crate::client::{CliError, offline};
use crate::print::print_json;

#[derive(Debug, Serialize)]
struct ListedItem<'a> {
    slug: &'a str,
    #[serde(rename = "type")]
    content_type: &'static str,
    date: String,
    theme: &'a str,
    draft: bool,
    title: &'a str,
}

pub fn handle(cli: &Cli, theme: Option<&str>, public: bool) -> Result<(), CliError> {
    let session = offline(cli)?;
    let lang = session.console.lang();
    let public_store;
    let store = if public {
        public_store = ContentStore::new(session.console.store().public_index());
        &public_store
    } else {
        session.console.store()
    };
    let items = match theme {
        Some(theme_id) => store.content_by_theme(theme_id),
        None => store.all_content(),
    };

    let listed: Vec<ListedItem<'_>> = items
        .into_iter()
        .map(|item| ListedItem {
            slug: &item.slug,
            content_type: item.content_type.as_str(),
            date: item.date.to_string(),
            theme: &item.theme_id,
            draft: item.is_draft,
            title: item.title.get(lang),
        })
        .collect();
    print_json(&listed)
}
