// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use user_service::{
    api::{rate_limit::prune_idle_clients, router},
    config::AppConfig,
    logging::init_tracing,
    state::AppState,
    storage::{UserDatabase, USER_DB_FILE},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing isn't up yet; the log format is part of the config.
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "user-service failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    tracing::info!(?config, "starting user-service");

    let db_path = config.data_dir.join(USER_DB_FILE);
    let db = UserDatabase::open(&db_path)?;
    db.seed_roles()?;
    tracing::info!(path = %db_path.display(), "user database ready");

    let state = AppState::new(db, &config);
    if let Some(password) = config.seed_admin_password.as_deref() {
        state.users.seed_admin(password)?;
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "user-service listening (docs at /docs)"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));
    tokio::spawn(prune_idle_clients(
        state.rate_limiter.clone(),
        shutdown.clone(),
    ));

    // Peer addresses feed the per-IP rate limiter.
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("user-service stopped");
    Ok(())
}

async fn watch_signals(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("shutdown signal received, draining connections");
            shutdown.cancel();
        }
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }
}
