use std::time::Duration;

use anyhow::Context;
use answer_core::config::DEFAULT_DISCOVERY_BASE_URL;
use answer_core::BackendConfig;
use answer_server::{logging::init_logging, run_server, AppState};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "answer-server")]
#[command(about = "Answer gateway for reasoning and discovery engines")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8081")]
    port: u16,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Google Cloud project id
    #[arg(long, env = "PROJECT_ID")]
    project_id: String,

    /// Discovery engine location
    #[arg(long, env = "LOCATION", default_value = "global")]
    location: String,

    #[arg(long, env = "COLLECTION_ID", default_value = "default_collection")]
    collection_id: String,

    #[arg(long, env = "ENGINE_ID")]
    engine_id: String,

    #[arg(long, env = "SERVING_CONFIG_ID", default_value = "default_search")]
    serving_config_id: String,

    /// Region hosting the reasoning engines
    #[arg(long, env = "REASONING_ENGINE_LOCATION", default_value = "us-central1")]
    reasoning_engine_location: String,

    /// Required in the X-Shared-Secret header when set
    #[arg(long, env = "SHARED_SECRET", hide_env_values = true)]
    shared_secret: Option<String>,

    /// Static bearer token; the metadata server is used when absent
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[arg(long, env = "DISCOVERY_BASE_URL", default_value = DEFAULT_DISCOVERY_BASE_URL)]
    discovery_base_url: String,

    #[arg(long, env = "REASONING_BASE_URL")]
    reasoning_base_url: Option<String>,

    #[arg(long, env = "METADATA_BASE_URL")]
    metadata_base_url: Option<String>,

    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value = "10")]
    connect_timeout_secs: u64,

    #[arg(long, env = "READ_TIMEOUT_SECS", default_value = "120")]
    read_timeout_secs: u64,
}

impl Cli {
    fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            project_id: self.project_id.clone(),
            location: self.location.clone(),
            collection_id: self.collection_id.clone(),
            engine_id: self.engine_id.clone(),
            serving_config_id: self.serving_config_id.clone(),
            reasoning_engine_location: self.reasoning_engine_location.clone(),
            discovery_base_url: self.discovery_base_url.clone(),
            reasoning_base_url: self.reasoning_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_level.as_deref());

    log::info!("Starting answer server on port {}", cli.port);
    if cli.debug {
        log::debug!("Debug mode enabled");
        log::debug!("  Collection: {}", cli.collection_id);
        log::debug!("  Serving config: {}", cli.serving_config_id);
        log::debug!("  Discovery base URL: {}", cli.discovery_base_url);
        log::debug!(
            "  Timeouts: connect {}s, read {}s",
            cli.connect_timeout_secs,
            cli.read_timeout_secs
        );
    }

    let state = AppState::new_with_config(
        cli.backend_config(),
        cli.access_token.clone(),
        cli.metadata_base_url.clone(),
    )
    .context("failed to initialize backend client")?;

    run_server(cli.port, state, cli.shared_secret.clone())
        .await
        .context("server error")?;

    Ok(())
}
