//! Server side of the publish contract: authenticate, then upsert each file.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use fieldnotes_relay_types::{
    MISSING_CONFIGURATION_MESSAGE, PublishRequest, PublishSuccess, UNAUTHORIZED_MESSAGE,
};
use metrics::counter;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{BackendError, RepositoryBackend};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,
    #[error("{}", MISSING_CONFIGURATION_MESSAGE)]
    MissingConfiguration,
    #[error("{0}")]
    InvalidRequest(String),
    /// Writes before `path` may already have landed.
    #[error("{source}")]
    Upstream {
        path: String,
        #[source]
        source: BackendError,
    },
}

impl RelayError {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Unauthorized => "unauthorized",
            RelayError::MissingConfiguration => "configuration",
            RelayError::InvalidRequest(_) => "invalid_request",
            RelayError::Upstream { .. } => "upstream",
        }
    }
}

#[derive(Clone)]
pub struct RelayService {
    admin_key_hash: Option<Vec<u8>>,
    backend: Option<Arc<dyn RepositoryBackend>>,
}

impl RelayService {
    /// `admin_key` or `backend` may be absent; the service then rejects every
    /// request with the matching contract error instead of refusing to start.
    pub fn new(admin_key: Option<&str>, backend: Option<Arc<dyn RepositoryBackend>>) -> Self {
        Self {
            admin_key_hash: admin_key
                .filter(|key| !key.is_empty())
                .map(hash_secret),
            backend,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.admin_key_hash.is_some() && self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|backend| backend.name())
    }

    fn authorize(&self, access_key: &str) -> Result<(), RelayError> {
        let expected = self
            .admin_key_hash
            .as_ref()
            .ok_or(RelayError::Unauthorized)?;
        if expected.ct_eq(&hash_secret(access_key)).unwrap_u8() == 0 {
            return Err(RelayError::Unauthorized);
        }
        Ok(())
    }

    pub async fn publish(&self, request: PublishRequest) -> Result<PublishSuccess, RelayError> {
        if let Err(err) = self.authorize(&request.access_key) {
            counter!("fieldnotes_relay_rejections_total", "reason" => err.kind()).increment(1);
            return Err(err);
        }
        let Some(backend) = self.backend.as_ref() else {
            counter!("fieldnotes_relay_rejections_total", "reason" => "configuration")
                .increment(1);
            return Err(RelayError::MissingConfiguration);
        };

        if request.files.iter().any(|file| file.path.trim().is_empty()) {
            counter!("fieldnotes_relay_rejections_total", "reason" => "invalid_request")
                .increment(1);
            return Err(RelayError::InvalidRequest(
                "file path must not be empty".to_string(),
            ));
        }

        for file in &request.files {
            let content = if file.is_binary {
                file.content.clone()
            } else {
                STANDARD.encode(file.content.as_bytes())
            };
            let message = request
                .message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("research(log): update {}", file.path));

            // A failed lookup is treated as "file absent"; the write decides.
            let version = match backend.current_version(&file.path).await {
                Ok(version) => version,
                Err(err) => {
                    warn!(
                        target = "fieldnotes::relay",
                        path = %file.path,
                        error = %err,
                        "version lookup failed; writing without a version marker"
                    );
                    None
                }
            };

            backend
                .put_file(&file.path, &content, &message, version.as_deref())
                .await
                .map_err(|source| RelayError::Upstream {
                    path: file.path.clone(),
                    source,
                })?;
            counter!("fieldnotes_relay_files_written_total").increment(1);
        }

        counter!("fieldnotes_relay_commits_total").increment(1);
        info!(
            target = "fieldnotes::relay",
            backend = backend.name(),
            files = request.files.len(),
            "batch committed"
        );
        Ok(PublishSuccess::committed())
    }
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}
