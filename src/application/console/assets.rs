use base64::{Engine as _, engine::general_purpose::STANDARD};
use fieldnotes_relay_types::FileEntry;
use tracing::{info, warn};

use super::{AdminConsole, UploadOutcome};
use crate::application::repos::CommitBatch;
use crate::domain::error::DomainError;
use crate::domain::paths::AssetTarget;

impl AdminConsole {
    /// Upload an image for the active document and reference it at the end of
    /// the active language's body.
    pub async fn upload_content_image(&mut self, file_name: &str, bytes: &[u8]) -> UploadOutcome {
        let slug = self
            .draft
            .as_ref()
            .map(|draft| draft.slug.clone())
            .unwrap_or_default();
        let target = match AssetTarget::content_image(&slug, file_name) {
            Ok(target) => target,
            Err(err) => return self.upload_rejected(err),
        };

        let outcome = self.upload(&target, bytes).await;
        if let (Some(url), Some(draft)) = (outcome.url.as_deref(), self.draft.as_mut()) {
            draft.append_image(self.lang, &target.file_name(), url);
        }
        outcome
    }

    /// Upload a profile photo; the author's `avatar` points at it afterwards.
    pub async fn upload_avatar(&mut self, file_name: &str, bytes: &[u8]) -> UploadOutcome {
        let target = match AssetTarget::avatar(file_name) {
            Ok(target) => target,
            Err(err) => return self.upload_rejected(err),
        };
        let outcome = self.upload(&target, bytes).await;
        if let Some(url) = &outcome.url {
            self.store.author_mut().avatar = Some(url.clone());
        }
        outcome
    }

    pub async fn upload_resume(&mut self, file_name: &str, bytes: &[u8]) -> UploadOutcome {
        let target = match AssetTarget::resume(file_name) {
            Ok(target) => target,
            Err(err) => return self.upload_rejected(err),
        };
        let outcome = self.upload(&target, bytes).await;
        if let Some(url) = &outcome.url {
            self.store.author_mut().resume_url = Some(url.clone());
        }
        outcome
    }

    pub async fn upload_theme_cover(
        &mut self,
        theme_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> UploadOutcome {
        if self.store.theme(theme_id).is_none() {
            return self.upload_rejected(DomainError::not_found("theme"));
        }
        let target = match AssetTarget::theme_cover(theme_id, file_name) {
            Ok(target) => target,
            Err(err) => return self.upload_rejected(err),
        };
        let outcome = self.upload(&target, bytes).await;
        if let Some(url) = &outcome.url
            && let Some(theme) = self
                .store
                .themes_mut()
                .iter_mut()
                .find(|theme| theme.id == theme_id)
        {
            theme.cover_image = Some(url.clone());
        }
        outcome
    }

    async fn upload(&mut self, target: &AssetTarget, bytes: &[u8]) -> UploadOutcome {
        let path = target.repo_path();
        self.log(format!("Uploading {path}..."));

        let batch = CommitBatch::new(
            format!("research(asset): {path} [web-commit]"),
            vec![FileEntry::binary(path.clone(), STANDARD.encode(bytes))],
        );

        match self.relay.publish(&self.access_key, batch).await {
            Ok(_) => {
                let version = self.now().unix_timestamp_nanos() / 1_000_000;
                let url = target.public_url(version);
                info!(
                    target = "fieldnotes::console",
                    path = %path,
                    media_type = %target.media_type(),
                    bytes = bytes.len(),
                    url = %url,
                    "asset uploaded"
                );
                self.log(format!("Uploaded: {url}"));
                UploadOutcome::uploaded(url)
            }
            Err(err) => {
                warn!(
                    target = "fieldnotes::console",
                    path = %path,
                    kind = err.kind(),
                    error = %err,
                    "asset upload failed"
                );
                let message = err.to_string();
                self.log(format!("Error: {message}"));
                UploadOutcome::failed(message)
            }
        }
    }

    fn upload_rejected(&mut self, error: DomainError) -> UploadOutcome {
        let message = error.to_string();
        self.log(format!("Error: {message}"));
        UploadOutcome::failed(message)
    }
}
