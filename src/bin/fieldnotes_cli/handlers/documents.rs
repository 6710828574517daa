#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;
use std::str::FromStr;

use fieldnotes::domain::draft::DraftField;
use fieldnotes::domain::markdown::render_markdown;
use fieldnotes::domain::types::{ContentType, Lang};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::args::{Cli, DraftCmd, DraftFieldArg};
use crate::client::{CliError, Session, connect, offline};
use crate::io::{read_text, read_value};
use crate::print::print_json;

pub fn handle(cli: &Cli, cmd: DraftCmd) -> Result<(), CliError> {
    let mut session = offline(cli)?;
    match cmd {
        DraftCmd::New => {
            session.console.new_document();
            session.save_draft()?;
            print_json(session.draft()?)
        }
        DraftCmd::Open { slug } => {
            session.console.open_document(&slug)?;
            session.save_draft()?;
            print_json(session.draft()?)
        }
        DraftCmd::Import { en, zh } => {
            let en = read_text(&en)?;
            let zh = read_text(&zh)?;
            session.console.import_mirrors(&en, &zh)?;
            session.save_draft()?;
            print_json(session.draft()?)
        }
        DraftCmd::Set {
            field,
            value,
            value_file,
        } => set(&mut session, field, value, value_file),
        DraftCmd::SuggestSlug => {
            let slug = session.console.suggest_slug()?;
            session.save_draft()?;
            println!("{slug}");
            Ok(())
        }
        DraftCmd::Show => print_json(session.draft()?),
        DraftCmd::Render => {
            let lang = session.console.lang();
            let today = OffsetDateTime::now_utc().date();
            print!("{}", render_markdown(session.draft()?, lang, today));
            Ok(())
        }
    }
}

fn set(
    session: &mut Session,
    field: DraftFieldArg,
    value: Option<String>,
    value_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let value = read_value(value, value_file)?;
    let field = to_field(field, session.console.lang(), value)?;
    session.console.set_field(field)?;
    session.save_draft()?;
    print_json(session.draft()?)
}

pub(crate) fn to_field(
    field: DraftFieldArg,
    lang: Lang,
    value: String,
) -> Result<DraftField, CliError> {
    Ok(match field {
        DraftFieldArg::Slug => DraftField::Slug(value),
        DraftFieldArg::Type => DraftField::ContentType(ContentType::from_str(&value)?),
        DraftFieldArg::Theme => DraftField::ThemeId(value),
        DraftFieldArg::Draft => DraftField::IsDraft(
            value
                .parse()
                .map_err(|_| CliError::InvalidInput(format!("expected true or false, got `{value}`")))?,
        ),
        DraftFieldArg::Date => DraftField::Date(parse_date(&value)?),
        DraftFieldArg::Title => DraftField::Title(lang, value),
        DraftFieldArg::Abstract => DraftField::Abstract(lang, value),
        DraftFieldArg::Content => DraftField::Content(lang, value),
        DraftFieldArg::Cover => DraftField::CoverImage(value),
        DraftFieldArg::Journal => DraftField::Journal(value),
        DraftFieldArg::RepoUrl => DraftField::RepoUrl(value),
        DraftFieldArg::NotionUrl => DraftField::NotionUrl(value),
        DraftFieldArg::TechStack => DraftField::TechStack(value),
        DraftFieldArg::CoAuthors => {
            DraftField::CoAuthors(value.lines().map(str::to_string).collect())
        }
    })
}

/// Blank clears the date so the commit date is used.
fn parse_date(value: &str) -> Result<Option<Date>, CliError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|e| CliError::InvalidInput(format!("date `{value}`: {e}")))
}

pub async fn commit(cli: &Cli) -> Result<(), CliError> {
    let mut session = connect(cli)?;
    session.draft()?;
    let outcome = session.console.commit().await;
    if outcome.success {
        session.save_index()?;
        session.save_draft()?;
    }
    session.report(&outcome)
}
