//! WebServer entry point
//!
//! Configuration comes from the environment (and `.env`); the flags below
//! override the listen address and log level.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shared::logging::{init_tracing, log_startup, log_success};
use shared::{process_info, AppConfig, ProcessId};

use webserver::{PipelineAnalyzer, RealFileManager, WebServer};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Ask Viridium AI HTTP service")]
struct Args {
    /// Interface to bind (defaults to HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP server (defaults to WEBSITES_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let process_id = ProcessId::init_webserver();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    init_tracing(Some(args.log_level.as_deref().unwrap_or(&config.log_level)));

    log_startup(
        process_id,
        &format!("webserver on {}:{}", config.server.host, config.server.port),
    );
    process_info!(
        process_id,
        "🤖 Using deployment {} ({})",
        config.llm.deployment_name,
        config.llm.model_name
    );

    let pipeline = analyzer::build_pipeline(&config)
        .await
        .context("Failed to build query pipeline")?;
    let analyzer = PipelineAnalyzer::new(Arc::new(pipeline));

    let server = WebServer::new(&config.server, analyzer, RealFileManager::new())
        .context("Failed to configure web server")?;
    server.run().await?;

    log_success(process_id, "WebServer stopped gracefully");
    Ok(())
}
