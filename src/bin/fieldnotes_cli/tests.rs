#![deny(clippy::all, clippy::pedantic)]

use std::path::Path;

use fieldnotes::domain::draft::DraftField;
use fieldnotes::domain::entities::{GlobalContentIndex, LocalizedString, ResearchTheme};
use fieldnotes::domain::types::{ContentType, Lang, ResearchStatus};
use httpmock::MockServer;
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};
use time::macros::date;

use crate::args::{Cli, Commands, DraftFieldArg, LangArg};
use crate::client::{CliError, connect, offline, read_key};
use crate::handlers::documents::to_field;

fn tmp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    std::io::Write::write_all(&mut file, contents.as_bytes()).expect("write tmp");
    file
}

fn seed_index(dir: &Path) -> std::path::PathBuf {
    let index = GlobalContentIndex {
        themes: vec![ResearchTheme {
            id: "green-architecture".into(),
            title: LocalizedString::new("Green Architecture", "绿色架构"),
            description: LocalizedString::default(),
            hypothesis: LocalizedString::default(),
            status: ResearchStatus::Active,
            order: 1,
            cover_image: None,
        }],
        ..GlobalContentIndex::default()
    };
    let path = dir.join("public/content.json");
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, serde_json::to_string(&index).expect("encode")).expect("seed");
    path
}

fn cli(dir: &Path, relay: Option<String>) -> Cli {
    Cli {
        relay,
        key_file: None,
        access_key_env: Some("secret123".to_string()),
        index: seed_index(dir),
        draft: dir.join(".fieldnotes/draft.toml"),
        lang: LangArg::En,
        command: Commands::Commit,
    }
}

#[test]
fn read_key_prefers_key_file() -> Result<(), CliError> {
    let dir = TempDir::new().expect("tempdir");
    let file = tmp_file("  file-key\n");
    let mut cli = cli(dir.path(), None);
    cli.key_file = Some(file.path().to_path_buf());

    assert_eq!(read_key(&cli)?, "file-key");
    Ok(())
}

#[test]
fn connect_requires_relay_and_key() {
    let dir = TempDir::new().expect("tempdir");
    let mut cli = cli(dir.path(), None);
    assert!(matches!(connect(&cli), Err(CliError::MissingRelay)));

    cli.relay = Some("http://127.0.0.1:9".to_string());
    cli.access_key_env = None;
    assert!(matches!(connect(&cli), Err(CliError::MissingKey)));
}

#[test]
fn to_field_parses_typed_values() -> Result<(), CliError> {
    assert_eq!(
        to_field(DraftFieldArg::Type, Lang::En, "project".into())?,
        DraftField::ContentType(ContentType::Project)
    );
    assert_eq!(
        to_field(DraftFieldArg::Date, Lang::En, "2024-03-15".into())?,
        DraftField::Date(Some(date!(2024 - 03 - 15)))
    );
    assert_eq!(
        to_field(DraftFieldArg::Date, Lang::En, " ".into())?,
        DraftField::Date(None)
    );
    assert_eq!(
        to_field(DraftFieldArg::Title, Lang::Zh, "测试".into())?,
        DraftField::Title(Lang::Zh, "测试".into())
    );
    assert_eq!(
        to_field(DraftFieldArg::CoAuthors, Lang::En, "Bai, Xinyu\nLi, Wei".into())?,
        DraftField::CoAuthors(vec!["Bai, Xinyu".into(), "Li, Wei".into()])
    );
    assert!(to_field(DraftFieldArg::Draft, Lang::En, "maybe".into()).is_err());
    Ok(())
}

#[test]
fn draft_survives_between_sessions() -> Result<(), CliError> {
    let dir = TempDir::new().expect("tempdir");
    let cli = cli(dir.path(), None);

    let mut first = offline(&cli)?;
    first.console.new_document();
    first
        .console
        .set_field(DraftField::Title(Lang::En, "Persisted".into()))?;
    first.save_draft()?;

    let second = offline(&cli)?;
    let draft = second.draft()?;
    assert_eq!(draft.title_en, "Persisted");
    assert_eq!(draft.theme_id, "green-architecture");
    Ok(())
}

#[test]
fn missing_draft_is_reported() -> Result<(), CliError> {
    let dir = TempDir::new().expect("tempdir");
    let session = offline(&cli(dir.path(), None))?;
    assert!(matches!(session.draft(), Err(CliError::NoDraft)));
    Ok(())
}

#[tokio::test]
async fn commit_updates_local_index_only_on_success() -> Result<(), CliError> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST").path("/api/publish");
            then.status(200)
                .json_body(json!({"success": true, "message": "Content committed to repository."}));
        })
        .await;

    let dir = TempDir::new().expect("tempdir");
    let cli = cli(dir.path(), Some(server.base_url()));
    let mut session = connect(&cli)?;
    session.console.new_document();
    for field in [
        DraftField::Slug("test-post".into()),
        DraftField::Title(Lang::En, "Test".into()),
        DraftField::Title(Lang::Zh, "测试".into()),
    ] {
        session.console.set_field(field)?;
    }

    let outcome = session.console.commit().await;
    assert!(outcome.success, "{}", outcome.message);
    session.save_index()?;

    let saved: GlobalContentIndex =
        serde_json::from_str(&std::fs::read_to_string(&cli.index).expect("read index"))
            .expect("parse index");
    assert_eq!(saved.content.len(), 1);
    assert_eq!(saved.content[0].slug, "test-post");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn rejected_commit_becomes_an_error() -> Result<(), CliError> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/api/publish");
            then.status(401)
                .json_body(json!({"message": "Unauthorized: Invalid Access Key"}));
        })
        .await;

    let dir = TempDir::new().expect("tempdir");
    let cli = cli(dir.path(), Some(server.base_url()));
    let mut session = connect(&cli)?;
    let outcome = session.console.commit_index("themes").await;

    let err = session.report(&outcome).expect_err("rejected");
    assert_eq!(err.to_string(), "Unauthorized: Invalid Access Key");
    Ok(())
}
