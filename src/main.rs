use std::{process, sync::Arc};

use fieldnotes::{
    application::{error::AppError, relay::RelayService, repos::RepositoryBackend},
    config::{self, BackendKind, Settings},
    infra::{
        error::InfraError, filesystem::FilesystemBackend, github::GitHubBackend, http, telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    match command {
        config::Command::Serve(_) => {
            telemetry::init(&settings.logging).map_err(AppError::from)?;
            run_serve(settings).await
        }
        config::Command::CheckConfig => {
            println!("{settings:#?}");
            Ok(())
        }
    }
}

fn build_backend(settings: &Settings) -> Result<Option<Arc<dyn RepositoryBackend>>, AppError> {
    let relay = &settings.relay;
    match relay.backend {
        BackendKind::Filesystem => Ok(Some(Arc::new(FilesystemBackend::new(
            relay.filesystem_root.clone(),
        )))),
        BackendKind::Github => {
            let Some((owner, repo, token)) = relay.github.credentials() else {
                warn!(
                    target = "fieldnotes::relay",
                    "GitHub owner, repo or token missing; publish requests will be refused"
                );
                return Ok(None);
            };
            let backend = GitHubBackend::new(
                relay.github.api_base.clone(),
                owner,
                repo,
                relay.branch.clone(),
                token,
            )?;
            Ok(Some(Arc::new(backend)))
        }
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let backend = build_backend(&settings)?;
    if settings.relay.admin_key.is_none() {
        warn!(
            target = "fieldnotes::relay",
            "no admin key configured; every publish request will be unauthorized"
        );
    }

    let relay = RelayService::new(settings.relay.admin_key.as_deref(), backend);
    let body_limit = usize::try_from(settings.relay.max_request_bytes.get())
        .map_err(|err| AppError::unexpected(format!("request limit out of range: {err}")))?;
    let router = http::build_router(relay.clone(), body_limit);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "fieldnotes::relay",
        addr = %settings.server.addr,
        backend = relay.backend_name().unwrap_or("none"),
        configured = relay.is_configured(),
        "relay listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return server_result(joined),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
    }
    info!(target = "fieldnotes::relay", "shutdown requested");
    let _ = stop_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!(
                target = "fieldnotes::relay",
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(result) => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}
