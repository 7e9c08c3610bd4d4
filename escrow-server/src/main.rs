use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use escrow_server::{AppState, ServerConfig, app, handlers::records::RecordSummary};
use escrow_storage::SqliteStore;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "escrow-server")]
#[command(about = "Custodial key escrow server", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the latest escrowed session key for an identity, base64-encoded
    Recover {
        #[arg(long)]
        identity: String,
    },
    /// List the newest escrow records without key material
    Records {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::from_env().context("invalid KEY_ESCROW_* configuration")?;

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let store = SqliteStore::open(&config.database_path).with_context(|| {
        format!("failed to open database at {}", config.database_path.display())
    })?;

    let state = AppState::new(
        config.clone(),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );

    let outcome = run(args.command.unwrap_or(Command::Serve), &config, state).await;

    if let Err(e) = store.close() {
        tracing::warn!("database not closed cleanly: {e}");
    }
    outcome
}

async fn run(command: Command, config: &ServerConfig, state: AppState) -> Result<()> {
    match command {
        Command::Serve => serve(config, state).await?,
        Command::Recover { identity } => {
            let key = state.recovery.recover(&identity).await?;
            println!("{}", key.to_base64());
        }
        Command::Records { limit } => {
            for record in state.escrow.recent(limit).await? {
                println!("{}", serde_json::to_string(&RecordSummary::from(&record))?);
            }
        }
    }
    Ok(())
}

async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
