//! Repository backend that writes into a local directory tree.
//!
//! The version marker is the hex SHA-256 of the current file bytes, so a
//! stale marker is detected the same way a remote sha mismatch would be.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::application::repos::{BackendError, RepositoryBackend};

#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(BackendError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn version_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[async_trait]
impl RepositoryBackend for FilesystemBackend {
    async fn current_version(&self, path: &str) -> Result<Option<String>, BackendError> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(Some(version_of(&bytes))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put_file(
        &self,
        path: &str,
        content_base64: &str,
        message: &str,
        version: Option<&str>,
    ) -> Result<(), BackendError> {
        let target = self.resolve(path)?;
        let bytes = STANDARD
            .decode(content_base64)
            .map_err(|_| BackendError::InvalidContent {
                path: path.to_string(),
            })?;

        if let Some(expected) = version
            && let Some(actual) = self.current_version(path).await?
            && actual != expected
        {
            return Err(BackendError::Upstream(format!(
                "{path} does not match {expected}"
            )));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &bytes).await?;

        debug!(
            target = "fieldnotes::filesystem",
            path,
            bytes = bytes.len(),
            message,
            "file written"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_create_parent_directories() {
        let dir = TempDir::new().expect("tempdir");
        let backend = FilesystemBackend::new(dir.path());

        assert!(
            backend
                .current_version("content/articles/a.en.md")
                .await
                .expect("lookup")
                .is_none()
        );

        backend
            .put_file(
                "content/articles/a.en.md",
                &STANDARD.encode("hello"),
                "research(log): A [web-commit]",
                None,
            )
            .await
            .expect("write");

        let written = std::fs::read_to_string(dir.path().join("content/articles/a.en.md"))
            .expect("read back");
        assert_eq!(written, "hello");
        assert_eq!(
            backend
                .current_version("content/articles/a.en.md")
                .await
                .expect("lookup"),
            Some(version_of(b"hello"))
        );
    }

    #[tokio::test]
    async fn overwrite_with_current_version_succeeds() {
        let dir = TempDir::new().expect("tempdir");
        let backend = FilesystemBackend::new(dir.path());
        backend
            .put_file("public/content.json", &STANDARD.encode("{}"), "m", None)
            .await
            .expect("create");

        let version = backend
            .current_version("public/content.json")
            .await
            .expect("lookup");
        backend
            .put_file(
                "public/content.json",
                &STANDARD.encode("{\"a\":1}"),
                "m",
                version.as_deref(),
            )
            .await
            .expect("update");

        let stale = backend
            .put_file(
                "public/content.json",
                &STANDARD.encode("{}"),
                "m",
                version.as_deref(),
            )
            .await
            .expect_err("stale version");
        assert!(matches!(stale, BackendError::Upstream(_)));
    }

    #[tokio::test]
    async fn binary_content_is_written_verbatim() {
        let dir = TempDir::new().expect("tempdir");
        let backend = FilesystemBackend::new(dir.path());
        let png = [0x89_u8, b'P', b'N', b'G', 0x00, 0xff];

        backend
            .put_file("public/images/a/b.png", &STANDARD.encode(png), "m", None)
            .await
            .expect("write");

        let written = std::fs::read(dir.path().join("public/images/a/b.png")).expect("read");
        assert_eq!(written, png);
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let backend = FilesystemBackend::new(dir.path());

        for path in ["../outside.md", "/etc/passwd", "content/../../x", ""] {
            let err = backend
                .put_file(path, "eA==", "m", None)
                .await
                .expect_err("rejected");
            assert!(matches!(err, BackendError::InvalidPath(_)), "{path}");
        }
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let backend = FilesystemBackend::new(dir.path());
        let err = backend
            .put_file("a.md", "***", "m", None)
            .await
            .expect_err("invalid");
        assert!(matches!(err, BackendError::InvalidContent { .. }));
    }
}
