use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use upi_gateway::application::engine::VerificationEngine;
use upi_gateway::config::GatewayConfig;
use upi_gateway::domain::ports::OrderStoreBox;
use upi_gateway::infrastructure::in_memory::InMemoryOrderStore;
use upi_gateway::infrastructure::paytm::PaytmOracle;
#[cfg(feature = "store-redis")]
use upi_gateway::infrastructure::redis::RedisOrderStore;
use upi_gateway::infrastructure::webhook::WebhookDispatcher;
use upi_gateway::interfaces::http::routes;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind the HTTP API to (overrides PORT).
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Redis connection URL. If provided, order records persist in Redis.
    #[cfg(feature = "store-redis")]
    #[arg(long)]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let store = build_store(&cli)?;
    let oracle = PaytmOracle::new(&config).into_diagnostic()?;
    let (dispatcher, webhook_worker) = WebhookDispatcher::start(&config).into_diagnostic()?;

    let engine = Arc::new(VerificationEngine::new(
        store,
        Box::new(oracle),
        Box::new(dispatcher),
        &config,
    ));

    let app = routes::router(engine, config.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .into_diagnostic()?;
    tracing::info!(addr = %config.bind_addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    // Serve returning drops the router and with it the engine's dispatcher
    // handle; the worker drains whatever is still queued, then exits.
    webhook_worker.await.into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "store-redis")]
fn build_store(cli: &Cli) -> Result<OrderStoreBox> {
    if let Some(url) = &cli.redis_url {
        let store = RedisOrderStore::open(url).into_diagnostic()?;
        tracing::info!("using redis order store");
        return Ok(Box::new(store));
    }
    Ok(Box::new(InMemoryOrderStore::new()))
}

#[cfg(not(feature = "store-redis"))]
fn build_store(_cli: &Cli) -> Result<OrderStoreBox> {
    Ok(Box::new(InMemoryOrderStore::new()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
