//! FootprintGuard HTTP scan service.

mod http;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use footprint_core::telemetry::{init_tracing, LogFormat};
use footprint_core::{ScanWorkflow, WorkflowConfig};
use footprint_providers::{http_provider_set, lazy_gemini, ProviderConfig};

#[derive(Parser, Debug)]
#[command(name = "footprintd")]
#[command(author, version, about = "FootprintGuard HTTP scan service")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "FOOTPRINT_LISTEN", default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Origins allowed to call the API from a browser
    #[arg(
        long = "cors-origin",
        env = "FOOTPRINT_CORS_ORIGINS",
        value_delimiter = ',',
        default_values = http::DEFAULT_CORS_ORIGINS
    )]
    cors_origins: Vec<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(LogFormat::resolve(args.json), level);

    let workflow_config = WorkflowConfig::from_env().context("invalid workflow configuration")?;
    let provider_config = ProviderConfig::from_env();

    let providers =
        http_provider_set(&provider_config).context("failed to build provider clients")?;
    let engine = lazy_gemini(&provider_config);
    if engine.is_none() {
        warn!("GEMINI_API_KEY not set; drafts and evaluation are rule-based");
    }

    let workflow = ScanWorkflow::from_config(&workflow_config, providers, engine)
        .context("failed to assemble scan workflow")?;
    info!(
        max_revisions = workflow.max_revisions(),
        engine_mode = ?workflow_config.engine_mode,
        "scan workflow ready"
    );

    let cors = http::cors_layer(&args.cors_origins).context("invalid CORS configuration")?;
    info!(origins = ?args.cors_origins, "CORS origins configured");
    let app = http::router(Arc::new(workflow), cors);
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!(addr = %args.listen, version = footprint_core::VERSION, "footprintd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("footprintd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
