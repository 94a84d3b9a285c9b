// Main entry point - Dependency injection and pipeline setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use tokio::sync::{RwLock, mpsc};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::application::framer::TelegramFramer;
use crate::application::ingest_service::IngestService;
use crate::application::readings_service::ReadingsService;
use crate::application::sampler::SamplingGate;
use crate::infrastructure::config::{SourceKind, load_config};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::infrastructure::line_source;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, latest_telegram, readings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let app_config = load_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        app_config.influx.host,
        app_config.influx.token,
        app_config.influx.database,
        app_config.influx.retention_policy,
    ));

    // Wire the ingest pipeline: line source -> channel -> framer -> parser -> gate -> store
    let last_telegram = Arc::new(RwLock::new(None));
    let (line_tx, line_rx) = mpsc::channel(1024);

    let ingest = IngestService::new(
        TelegramFramer::new(app_config.meter.header_marker),
        SamplingGate::new(app_config.meter.sample_density),
        repository.clone(),
        last_telegram.clone(),
    );
    tokio::spawn(ingest.run(line_rx));

    match app_config.source.kind {
        SourceKind::Tcp => {
            let addr = app_config
                .source
                .addr
                .context("source.addr is required for a tcp source")?;
            tokio::spawn(line_source::run_tcp_source(addr, line_tx));
        }
        SourceKind::File => {
            let path = app_config
                .source
                .path
                .context("source.path is required for a file source")?;
            tokio::spawn(async move {
                if let Err(e) = line_source::run_file_source(&path, line_tx).await {
                    tracing::error!("file source failed: {e:#}");
                }
            });
        }
    }

    // Create application state
    let state = Arc::new(AppState {
        readings_service: ReadingsService::new(repository),
        last_telegram,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/readings.json", get(readings))
        .route("/latest", get(latest_telegram))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .http
        .listen_addr
        .parse()
        .context("invalid http.listen_addr")?;
    tracing::info!("starting p1-telemetry service on {addr}");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
