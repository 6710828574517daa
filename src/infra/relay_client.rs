//! HTTP client side of the publish contract.

use async_trait::async_trait;
use fieldnotes_relay_types::{
    MISSING_CONFIGURATION_MESSAGE, PUBLISH_PATH, PublishRequest, PublishSuccess, RelayMessage,
};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::application::repos::{CommitBatch, CommitError, RelayRepo};

use super::error::InfraError;

/// Shown when a failed response carries no readable `message`.
const FALLBACK_FAILURE: &str = "Commit failed";

#[derive(Clone, Debug)]
pub struct HttpRelayClient {
    client: Client,
    endpoint: Url,
}

impl HttpRelayClient {
    /// `base` is the relay origin; the publish route is appended to it.
    pub fn new(base: &str) -> Result<Self, InfraError> {
        let endpoint = Url::parse(base)
            .and_then(|url| url.join(PUBLISH_PATH))
            .map_err(|err| InfraError::configuration(format!("invalid relay url `{base}`: {err}")))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(InfraError::http_client)?;
        Ok(Self { client, endpoint })
    }

    pub fn user_agent() -> &'static str {
        concat!("fieldnotes/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RelayRepo for HttpRelayClient {
    async fn publish(&self, access_key: &str, batch: CommitBatch) -> Result<String, CommitError> {
        let request = PublishRequest {
            access_key: access_key.to_string(),
            message: Some(batch.message),
            files: batch.files,
        };
        debug!(
            target = "fieldnotes::relay_client",
            endpoint = %self.endpoint,
            files = request.files.len(),
            "sending publish batch"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| CommitError::Transport(format!("relay unreachable: {err}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CommitError::Transport(format!("failed to read response: {err}")))?;

        if status.is_success() {
            let body: PublishSuccess = serde_json::from_slice(&bytes)
                .map_err(|err| CommitError::Decode(format!("failed to parse body: {err}")))?;
            return Ok(body.message);
        }

        let message = serde_json::from_slice::<RelayMessage>(&bytes)
            .map(|body| body.message)
            .ok()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_FAILURE.to_string());

        Err(classify_failure(status, message))
    }
}

fn classify_failure(status: StatusCode, message: String) -> CommitError {
    match status {
        StatusCode::UNAUTHORIZED => CommitError::Unauthorized(message),
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => CommitError::Validation(message),
        StatusCode::INTERNAL_SERVER_ERROR if message == MISSING_CONFIGURATION_MESSAGE => {
            CommitError::Configuration(message)
        }
        _ => CommitError::Upstream(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldnotes_relay_types::{FileEntry, UNAUTHORIZED_MESSAGE};
    use httpmock::MockServer;
    use serde_json::json;

    fn batch() -> CommitBatch {
        CommitBatch::new(
            "research(log): Test [web-commit]",
            vec![FileEntry::text("content/articles/a.en.md", "body")],
        )
    }

    #[tokio::test]
    async fn success_returns_relay_message() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/api/publish")
                    .header("content-type", "application/json");
                then.status(200)
                    .json_body(json!({"success": true, "message": "Content committed to repository."}));
            })
            .await;

        let client = HttpRelayClient::new(&server.base_url()).expect("client");
        let message = client.publish("secret123", batch()).await.expect("publish");

        assert_eq!(message, "Content committed to repository.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_keeps_server_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/api/publish");
                then.status(401)
                    .json_body(json!({"message": UNAUTHORIZED_MESSAGE}));
            })
            .await;

        let client = HttpRelayClient::new(&server.base_url()).expect("client");
        let err = client.publish("wrong", batch()).await.expect_err("rejected");

        assert_eq!(err, CommitError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()));
        assert_eq!(err.to_string(), "Unauthorized: Invalid Access Key");
    }

    #[tokio::test]
    async fn missing_configuration_is_classified() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/api/publish");
                then.status(500)
                    .json_body(json!({"message": MISSING_CONFIGURATION_MESSAGE}));
            })
            .await;

        let client = HttpRelayClient::new(&server.base_url()).expect("client");
        let err = client.publish("k", batch()).await.expect_err("rejected");
        assert_eq!(err.kind(), "configuration");
    }

    #[tokio::test]
    async fn unreadable_failure_body_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/api/publish");
                then.status(502).body("<html>bad gateway</html>");
            })
            .await;

        let client = HttpRelayClient::new(&server.base_url()).expect("client");
        let err = client.publish("k", batch()).await.expect_err("rejected");
        assert_eq!(err, CommitError::Upstream("Commit failed".to_string()));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/api/publish");
                then.status(200).body("not json");
            })
            .await;

        let client = HttpRelayClient::new(&server.base_url()).expect("client");
        let err = client.publish("k", batch()).await.expect_err("decode");
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn endpoint_joins_publish_route() {
        let client = HttpRelayClient::new("https://relay.example.org/").expect("client");
        assert_eq!(
            client.endpoint().as_str(),
            "https://relay.example.org/api/publish"
        );
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(HttpRelayClient::new("not a url").is_err());
    }
}
