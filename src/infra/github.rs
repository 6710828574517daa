//! Repository backend speaking the GitHub contents API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::repos::{BackendError, RepositoryBackend};

use super::error::InfraError;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

#[derive(Clone)]
pub struct GitHubBackend {
    client: Client,
    api_base: Url,
    owner: String,
    repo: String,
    branch: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ContentMeta {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GitHubMessage {
    message: String,
}

impl GitHubBackend {
    pub fn new(
        api_base: Url,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("fieldnotes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InfraError::http_client)?;
        Ok(Self {
            client,
            api_base,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token: token.into(),
        })
    }

    fn contents_url(&self, path: &str) -> Result<Url, BackendError> {
        if path.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return Err(BackendError::InvalidPath(path.to_string()));
        }
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::upstream("api base cannot carry a path"))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/'));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
    }
}

async fn failure(response: Response) -> BackendError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<GitHubMessage>(&text) {
        Ok(body) if !body.message.is_empty() => BackendError::Upstream(body.message),
        _ => BackendError::Upstream(format!("status {status} body {text}")),
    }
}

#[async_trait]
impl RepositoryBackend for GitHubBackend {
    async fn current_version(&self, path: &str) -> Result<Option<String>, BackendError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(BackendError::upstream)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let meta: ContentMeta = response.json().await.map_err(BackendError::upstream)?;
        Ok(Some(meta.sha))
    }

    async fn put_file(
        &self,
        path: &str,
        content_base64: &str,
        message: &str,
        version: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.contents_url(path)?;
        let body = PutContents {
            message,
            content: content_base64,
            branch: &self.branch,
            sha: version,
        };

        let response = self
            .request(Method::PUT, url)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::upstream)?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        debug!(
            target = "fieldnotes::github",
            path,
            updated = version.is_some(),
            "contents written"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use serde_json::json;

    fn backend(server: &MockServer) -> GitHubBackend {
        let base = Url::parse(&server.base_url()).expect("base url");
        GitHubBackend::new(base, "alice", "research-log", "main", "ghp_token").expect("backend")
    }

    #[tokio::test]
    async fn existing_file_reports_its_sha() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/repos/alice/research-log/contents/public/content.json")
                    .query_param("ref", "main")
                    .header("authorization", "Bearer ghp_token");
                then.status(200).json_body(json!({"sha": "abc123", "path": "public/content.json"}));
            })
            .await;

        let version = backend(&server)
            .current_version("public/content.json")
            .await
            .expect("lookup");

        assert_eq!(version.as_deref(), Some("abc123"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_file_has_no_version() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/repos/alice/research-log/contents/content/articles/new.en.md");
                then.status(404).json_body(json!({"message": "Not Found"}));
            })
            .await;

        let version = backend(&server)
            .current_version("content/articles/new.en.md")
            .await
            .expect("lookup");
        assert!(version.is_none());
    }

    #[tokio::test]
    async fn put_sends_sha_only_for_updates() {
        let server = MockServer::start_async().await;
        let update = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/repos/alice/research-log/contents/public/content.json")
                    .json_body(json!({
                        "message": "research(index): themes [web-commit]",
                        "content": "e30=",
                        "branch": "main",
                        "sha": "abc123"
                    }));
                then.status(200).json_body(json!({}));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/repos/alice/research-log/contents/content/articles/a.zh.md")
                    .json_body(json!({
                        "message": "research(log): A [web-commit]",
                        "content": "eA==",
                        "branch": "main"
                    }));
                then.status(201).json_body(json!({}));
            })
            .await;

        let backend = backend(&server);
        backend
            .put_file(
                "public/content.json",
                "e30=",
                "research(index): themes [web-commit]",
                Some("abc123"),
            )
            .await
            .expect("update");
        backend
            .put_file(
                "content/articles/a.zh.md",
                "eA==",
                "research(log): A [web-commit]",
                None,
            )
            .await
            .expect("create");

        update.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_message_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT");
                then.status(409)
                    .json_body(json!({"message": "public/content.json does not match abc123"}));
            })
            .await;

        let err = backend(&server)
            .put_file("public/content.json", "e30=", "m", Some("abc123"))
            .await
            .expect_err("conflict");
        assert_eq!(err.to_string(), "public/content.json does not match abc123");
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected_before_sending() {
        let server = MockServer::start_async().await;
        let err = backend(&server)
            .current_version("../secrets")
            .await
            .expect_err("invalid path");
        assert!(matches!(err, BackendError::InvalidPath(_)));
    }
}
