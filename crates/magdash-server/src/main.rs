mod api;
mod middleware;
mod relay;
mod scheduler;
mod trigger;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
    relay::SyncRelay,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = magdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    for var in config.missing_credentials() {
        tracing::warn!(var, "credential not set; hosted access is degraded");
    }

    let client = magdash_db::HostedClient::from_config(&config)?;
    let relay = SyncRelay::from_config(&config)?;

    let _scheduler = scheduler::build_scheduler(relay.clone(), config.sync_cron.as_deref()).await?;

    let auth = AuthState::from_env(matches!(config.env, magdash_core::Environment::Development))?;
    let app = build_app(
        AppState {
            client,
            relay,
            locale: config.locale,
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "magdash-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
