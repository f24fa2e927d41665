use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::serve;
use fanlink_api::router;
use fanlink_config::load as load_config;
use fanlink_resolver::AppState;
use fanlink_scheduler::Scheduler;
use fanlink_store::{init_pool, SqlitePresaveRepository};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_config(None)?;

    let pool = init_pool(&config).await?;
    let store = Arc::new(SqlitePresaveRepository::new(pool));

    let state = AppState::new(config.clone(), store);

    let scheduler = Scheduler::new(config.clone(), state.sweep.clone());
    scheduler.register_jobs().await;
    let _scheduler_handle = scheduler.start();

    let listener = TcpListener::bind(bind_addr(&config.http)).await?;
    let addr = listener.local_addr()?;
    info!(target: "cli", "listening on {}", addr);

    serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let fmt_layer = fmt::layer().with_target(true).with_thread_names(true).with_level(true);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn bind_addr(http: &fanlink_config::HttpConfig) -> SocketAddr {
    let addr = format!("{}:{}", http.host, http.port);
    addr.parse().expect("valid listen address")
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let mut interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("install SIGINT handler");

    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("install SIGTERM handler");

    #[cfg(not(unix))]
    let interrupt = tokio::signal::ctrl_c();

    #[cfg(unix)]
    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
    }

    #[cfg(not(unix))]
    {
        interrupt.await.expect("ctrl_c handler");
    }

    info!(target: "cli", "shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_parses_ipv4() {
        let http = fanlink_config::HttpConfig {
            host: "127.0.0.1".to_string(),
            port: 5160,
        };
        let addr = bind_addr(&http);
        assert_eq!(addr.port(), 5160);
        assert!(addr.is_ipv4());
    }

    #[test]
    fn bind_addr_parses_ipv6() {
        let http = fanlink_config::HttpConfig {
            host: "[::1]".to_string(),
            port: 8080,
        };
        let addr = bind_addr(&http);
        assert_eq!(addr.port(), 8080);
        assert!(addr.is_ipv6());
    }
}
