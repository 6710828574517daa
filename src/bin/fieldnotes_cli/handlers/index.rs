#![deny(clippy::all, clippy::pedantic)]

use fieldnotes::domain::entities::{Education, LocalizedString, ResearchTheme};
use fieldnotes::domain::error::DomainError;
use fieldnotes::domain::types::ResearchStatus;

use crate::args::{Cli, ProfileCmd, ProfileFieldArg, SpeculativeCmd, ThemeText, ThemesCmd};
use crate::client::{CliError, Session, connect, offline};
use crate::print::print_json;

/// Commit the index after a local edit; the local copy is only replaced on success.
pub(crate) async fn sync(session: &mut Session, what: &str) -> Result<(), CliError> {
    let outcome = session.console.commit_index(what).await;
    if outcome.success {
        session.save_index()?;
    }
    session.report(&outcome)
}

fn apply_text(theme: &mut ResearchTheme, text: ThemeText) {
    let ThemeText {
        title_en,
        title_zh,
        description_en,
        description_zh,
        hypothesis_en,
        hypothesis_zh,
        status,
    } = text;
    let pairs = [
        (title_en, &mut theme.title.en),
        (title_zh, &mut theme.title.zh),
        (description_en, &mut theme.description.en),
        (description_zh, &mut theme.description.zh),
        (hypothesis_en, &mut theme.hypothesis.en),
        (hypothesis_zh, &mut theme.hypothesis.zh),
    ];
    for (value, slot) in pairs {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(status) = status {
        theme.status = status.into();
    }
}

pub async fn themes(cli: &Cli, cmd: ThemesCmd) -> Result<(), CliError> {
    let mut session = if matches!(cmd, ThemesCmd::List) {
        offline(cli)?
    } else {
        connect(cli)?
    };
    match cmd {
        ThemesCmd::List => return print_json(&session.console.store().themes_in_order()),
        ThemesCmd::Add { id, text } => {
            let mut theme = ResearchTheme {
                id,
                title: LocalizedString::default(),
                description: LocalizedString::default(),
                hypothesis: LocalizedString::default(),
                status: ResearchStatus::default(),
                order: 0,
                cover_image: None,
            };
            apply_text(&mut theme, text);
            session.console.add_theme(theme)?;
        }
        ThemesCmd::Update { id, text } => {
            session
                .console
                .update_theme(&id, |theme| apply_text(theme, text))?;
        }
        ThemesCmd::Move { id, direction } => {
            let position = session
                .console
                .store()
                .themes_in_order()
                .iter()
                .position(|theme| theme.id == id)
                .ok_or_else(|| DomainError::not_found("theme"))?;
            if !session.console.move_theme(position, direction.into())? {
                return Err(CliError::InvalidInput(format!(
                    "theme `{id}` cannot move further"
                )));
            }
        }
        ThemesCmd::Remove { id } => {
            session.console.remove_theme(&id)?;
        }
    }
    sync(&mut session, "themes").await
}

pub async fn speculative(cli: &Cli, cmd: SpeculativeCmd) -> Result<(), CliError> {
    let mut session = connect(cli)?;
    match cmd {
        SpeculativeCmd::Add { en, zh } => {
            session.console.add_speculative(LocalizedString::new(en, zh));
        }
        SpeculativeCmd::Update { id, en, zh } => {
            session
                .console
                .update_speculative(&id, LocalizedString::new(en, zh))?;
        }
        SpeculativeCmd::Remove { id } => {
            session.console.remove_speculative(&id)?;
        }
        SpeculativeCmd::Title { en, zh } => {
            session
                .console
                .set_speculative_title(LocalizedString::new(en, zh));
        }
    }
    sync(&mut session, "speculative").await
}

pub async fn profile(cli: &Cli, cmd: ProfileCmd) -> Result<(), CliError> {
    let mut session = if matches!(cmd, ProfileCmd::Show) {
        offline(cli)?
    } else {
        connect(cli)?
    };
    let lang = session.console.lang();
    match cmd {
        ProfileCmd::Show => return print_json(session.console.store().author()),
        ProfileCmd::Set { field, value } => session.console.update_author(|author| match field {
            ProfileFieldArg::Name => *author.name.get_mut(lang) = value,
            ProfileFieldArg::Role => *author.role.get_mut(lang) = value,
            ProfileFieldArg::Affiliation => *author.affiliation.get_mut(lang) = value,
            ProfileFieldArg::Bio => *author.bio.get_mut(lang) = value,
            ProfileFieldArg::Email => author.email = value,
            ProfileFieldArg::Github => author.github = value,
            ProfileFieldArg::Scholar => {
                author.scholar = (!value.trim().is_empty()).then_some(value);
            }
        }),
        ProfileCmd::AddEducation {
            school_en,
            school_zh,
            department_en,
            department_zh,
            major_en,
            major_zh,
            stage_en,
            stage_zh,
        } => session.console.add_education(Education {
            school: LocalizedString::new(school_en, school_zh),
            department: LocalizedString::new(department_en, department_zh),
            major: LocalizedString::new(major_en, major_zh),
            stage: LocalizedString::new(stage_en, stage_zh),
        }),
        ProfileCmd::RemoveEducation { position } => {
            session.console.remove_education(position)?;
        }
    }
    sync(&mut session, "profile").await
}
