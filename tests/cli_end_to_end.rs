#![deny(clippy::all, clippy::pedantic)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use fieldnotes::domain::draft::{Draft, DraftField};
use fieldnotes::domain::entities::GlobalContentIndex;
use fieldnotes::domain::types::Lang;
use httpmock::MockServer;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn seed_index(dir: &Path) -> PathBuf {
    let path = dir.join("content.json");
    std::fs::write(
        &path,
        serde_json::to_string(&GlobalContentIndex::default()).expect("encode"),
    )
    .expect("seed index");
    path
}

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fieldnotes-cli"));
    cmd.env_remove("FIELDNOTES_RELAY_URL")
        .env_remove("FIELDNOTES_ACCESS_KEY_FILE")
        .env("FIELDNOTES_ACCESS_KEY", "secret123")
        .env("FIELDNOTES_INDEX", seed_index(dir))
        .env("FIELDNOTES_DRAFT", dir.join("draft.toml"));
    cmd
}

#[test]
fn draft_edit_then_commit_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/publish");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success":true,"message":"Content committed to repository."}"#);
    });

    cli(dir.path()).args(["draft", "new"]).assert().success();
    cli(dir.path())
        .args(["draft", "set", "slug", "test-post"])
        .assert()
        .success();
    cli(dir.path())
        .args(["draft", "set", "title", "Test"])
        .assert()
        .success();
    cli(dir.path())
        .args(["--lang", "zh", "draft", "set", "title", "测试"])
        .assert()
        .success();

    let assert = cli(dir.path())
        .env("FIELDNOTES_RELAY_URL", server.base_url())
        .arg("commit")
        .assert()
        .success()
        .stderr(contains("Initiating commit sequence..."));

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Successfully committed: test-post"));
    mock.assert();

    let index: GlobalContentIndex = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("content.json")).expect("index"),
    )
    .expect("parse index");
    assert_eq!(index.content.len(), 1);
}

#[test]
fn missing_metadata_never_reaches_the_relay() {
    let dir = TempDir::new().expect("tempdir");
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/publish");
        then.status(200);
    });

    cli(dir.path()).args(["draft", "new"]).assert().success();
    cli(dir.path())
        .env("FIELDNOTES_RELAY_URL", server.base_url())
        .arg("commit")
        .assert()
        .failure()
        .stderr(contains("Error: Missing metadata (Slug or Title)."));

    mock.assert_calls(0);
}

#[test]
fn missing_relay_fails_fast() {
    let dir = TempDir::new().expect("tempdir");
    cli(dir.path()).args(["draft", "new"]).assert().success();
    cli(dir.path())
        .arg("commit")
        .assert()
        .failure()
        .stderr(contains("MissingRelay"));
}

#[test]
fn public_listing_hides_drafts() {
    let dir = TempDir::new().expect("tempdir");
    let mut index = GlobalContentIndex::default();
    for (slug, is_draft) in [("published-note", false), ("work-in-progress", true)] {
        let mut draft = Draft::default();
        draft.set(DraftField::Slug(slug.into()));
        draft.set(DraftField::Title(Lang::En, slug.into()));
        draft.set(DraftField::IsDraft(is_draft));
        index
            .content
            .push(draft.to_content_item(time::macros::date!(2024 - 05 - 01)));
    }
    let path = dir.path().join("site.json");
    std::fs::write(&path, serde_json::to_string(&index).expect("encode")).expect("write");

    cli(dir.path())
        .env("FIELDNOTES_INDEX", &path)
        .args(["list", "--public"])
        .assert()
        .success()
        .stdout(contains("published-note"))
        .stdout(contains("work-in-progress").not());

    cli(dir.path())
        .env("FIELDNOTES_INDEX", &path)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("work-in-progress"));
}
