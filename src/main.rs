use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use whatsapp_gateway::{
    config::Config,
    routes,
    services::{lifecycle::ServiceProcess, upstream::UpstreamClient, users::UserStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let upstream = UpstreamClient::new(&config.service_url)?;
    let users = UserStore::open(&config.database_path).await?;
    let state = Arc::new(AppState::new(upstream, users, &config.static_dir));

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    let bound = listener.local_addr()?;
    tracing::info!(%bound, upstream = %config.service_url, "WhatsApp gateway listening");

    let service = Arc::new(ServiceProcess::new(
        config.service_command.clone(),
        config.service_url.port_or_known_default(),
    ));
    if config.spawn_service {
        service.schedule_start(bound);
    }

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    service.stop().await;
    tracing::info!("WhatsApp gateway stopped");
    served.context("server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
}
