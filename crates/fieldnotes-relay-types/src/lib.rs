//! Request and response bodies exchanged with the repository commit relay.
//!
//! The relay accepts a single `POST` carrying a shared secret and an ordered
//! batch of files. Field names follow the JSON contract (`accessKey`,
//! `isBinary`) so browsers and the Rust client speak the same payloads.

use serde::{Deserialize, Serialize};

/// Route served by the relay.
pub const PUBLISH_PATH: &str = "/api/publish";

/// Body message returned when the shared secret does not match.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid Access Key";

/// Body message returned when upstream credentials are absent on the server.
pub const MISSING_CONFIGURATION_MESSAGE: &str = "Server Configuration Error: Missing Env Vars";

/// Body message returned for non-`POST` requests.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// Body message returned after every file in the batch was written.
pub const COMMITTED_MESSAGE: &str = "Content committed to repository.";

/// One file write inside a publish batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub path: String,
    pub content: String,
    /// When set, `content` is already base64 and is forwarded untouched.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_binary: bool,
}

impl FileEntry {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            is_binary: false,
        }
    }

    pub fn binary(path: impl Into<String>, base64_content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: base64_content.into(),
            is_binary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub access_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSuccess {
    pub success: bool,
    pub message: String,
}

impl PublishSuccess {
    pub fn committed() -> Self {
        Self {
            success: true,
            message: COMMITTED_MESSAGE.to_string(),
        }
    }
}

/// Error body; every non-200 relay response carries exactly this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub message: String,
}

impl RelayMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_keys() {
        let request = PublishRequest {
            access_key: "secret123".into(),
            message: Some("research(log): Test [web-commit]".into()),
            files: vec![
                FileEntry::text("content/articles/a.en.md", "body"),
                FileEntry::binary("public/images/a/b.png", "iVBORw0K"),
            ],
        };

        let value = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(value["accessKey"], "secret123");
        assert!(value["files"][0].get("isBinary").is_none());
        assert_eq!(value["files"][1]["isBinary"], true);
    }

    #[test]
    fn request_tolerates_missing_optional_fields() {
        let request: PublishRequest =
            serde_json::from_str(r#"{"files":[{"path":"a.md","content":"x"}]}"#)
                .expect("parse request");
        assert_eq!(request.access_key, "");
        assert_eq!(request.message, None);
        assert!(!request.files[0].is_binary);
    }
}
