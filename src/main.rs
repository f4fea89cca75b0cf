use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use fanout_notify::config::Settings;
use fanout_notify::server::app::{build_ingest_router, build_read_router};
use fanout_notify::server::state::Pipeline;
use fanout_notify::shutdown::shutdown_pipeline;
use fanout_notify::store::User;
use fanout_notify::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();

    let settings = Settings::new()?;
    tracing::info!("configuration loaded");

    let pipeline = Pipeline::new(&settings.pipeline);
    seed_users(&pipeline).await;

    let ingest_app = build_ingest_router(pipeline.ingest_state());
    let read_app = build_read_router(pipeline.read_state(&settings));

    let ingest_listener = TcpListener::bind(&settings.ingest_addr()).await?;
    let read_listener = TcpListener::bind(&settings.read_addr()).await?;
    tracing::info!(addr = %settings.ingest_addr(), "ingest listener bound");
    tracing::info!(addr = %settings.read_addr(), "read listener bound");

    let shutdown = shutdown_signal_channel();

    let ingest_shutdown = recv_once(shutdown.subscribe());
    let ingest_handle = tokio::spawn(async move {
        axum::serve(ingest_listener, ingest_app).with_graceful_shutdown(ingest_shutdown).await
    });
    let read_shutdown = recv_once(shutdown.subscribe());
    let read_handle = tokio::spawn(async move {
        axum::serve(read_listener, read_app).with_graceful_shutdown(read_shutdown).await
    });

    wait_for_shutdown_signal().await;
    let _ = shutdown.send(());

    let _ = tokio::join!(ingest_handle, read_handle);

    let drain_timeout = Duration::from_millis(settings.pipeline.shutdown_timeout_ms);
    shutdown_pipeline(&pipeline.queue, drain_timeout).await;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Seed a handful of users with a follower graph so the service is usable
/// without a separate user-management API. Not part of the delivery-pipeline
/// contract; the design has no dynamic user registration.
async fn seed_users(pipeline: &Pipeline) {
    let mut alice = User::new("alice", "Alice");
    alice.followers = vec!["bob".to_string(), "carol".to_string(), "dave".to_string()];
    pipeline.store.put_user(alice).await;
    pipeline.store.put_user(User::new("bob", "Bob")).await;
    pipeline.store.put_user(User::new("carol", "Carol")).await;
    pipeline.store.put_user(User::new("dave", "Dave")).await;
    tracing::info!("seeded 4 users");
}

fn shutdown_signal_channel() -> tokio::sync::broadcast::Sender<()> {
    let (tx, _) = tokio::sync::broadcast::channel(1);
    tx
}

async fn recv_once(mut rx: tokio::sync::broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("received terminate signal, initiating graceful shutdown"),
    }
}
