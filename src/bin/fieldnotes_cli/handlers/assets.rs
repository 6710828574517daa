#![deny(clippy::all, clippy::pedantic)]

use crate::args::{Cli, UploadCmd};
use crate::client::{CliError, connect};
use crate::handlers::index::sync;
use crate::io::read_asset;

/// Upload an asset. Profile and theme assets are followed by an index commit
/// so the new URL is published with the index.
pub async fn handle(cli: &Cli, cmd: UploadCmd) -> Result<(), CliError> {
    let mut session = connect(cli)?;
    match cmd {
        UploadCmd::Image { path } => {
            session.draft()?;
            let (name, bytes) = read_asset(&path)?;
            let outcome = session.console.upload_content_image(&name, &bytes).await;
            if outcome.success {
                session.save_draft()?;
            }
            session.report_upload(&outcome)
        }
        UploadCmd::Avatar { path } => {
            let (name, bytes) = read_asset(&path)?;
            let outcome = session.console.upload_avatar(&name, &bytes).await;
            session.report_upload(&outcome)?;
            sync(&mut session, "profile").await
        }
        UploadCmd::Resume { path } => {
            let (name, bytes) = read_asset(&path)?;
            let outcome = session.console.upload_resume(&name, &bytes).await;
            session.report_upload(&outcome)?;
            sync(&mut session, "profile").await
        }
        UploadCmd::ThemeCover { theme, path } => {
            let (name, bytes) = read_asset(&path)?;
            let outcome = session.console.upload_theme_cover(&theme, &name, &bytes).await;
            session.report_upload(&outcome)?;
            sync(&mut session, "themes").await
        }
    }
}
