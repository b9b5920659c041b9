//! Relay server entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use relay::chat::build_chat_sink;
use relay::config::Config;
use relay::dispatcher::CommandDispatcher;
use relay::gateway::{HandlerState, create_router_with_state};
use relay::lifecycle::{InstanceId, LifecycleConfig, build_cloud_ops};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    let lifecycle_config = LifecycleConfig::from_env()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        instance_id = %lifecycle_config.instance_id,
        provider = ?lifecycle_config.cloud_provider,
        transport = ?config.chat_transport,
        "Relay starting"
    );

    let cloud_ops = build_cloud_ops(&lifecycle_config);
    let sink = build_chat_sink(&config)?;

    let bot_user_id = match config.bot_user_id.clone() {
        Some(id) => Some(id),
        None => sink.current_user_id().await?,
    };
    match &bot_user_id {
        Some(id) => tracing::info!(bot_user_id = %id, "Ignoring messages from the bot itself"),
        None => tracing::warn!("Bot user id unknown, ignoring every bot-authored message"),
    }

    let dispatcher = CommandDispatcher::new(
        cloud_ops,
        InstanceId::new(&lifecycle_config.instance_id),
        lifecycle_config.convergence,
        sink,
    )
    .with_bot_user_id(bot_user_id);

    let app = create_router_with_state(HandlerState::new(dispatcher));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Relay shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("RELAY_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
