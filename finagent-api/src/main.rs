mod config;
mod handlers;
mod models;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use crate::config::ApiConfig;
use finagent_agent::storage::InMemoryStorage;
use finagent_llm::client::LlmClient;
use finagent_llm::openai::client::OpenAIClient;
use finagent_tools::ToolExecutor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finagent-api", about = "HTTP API for the finagent stock assistant")]
struct Cli {
    /// Path to the config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (api_config, config_path) = ApiConfig::load(cli.config)
        .map_err(|e| std::io::Error::other(format!("Failed to load config: {}", e)))?;
    info!(config_path = %config_path.display(), "Loaded configuration");

    let api_key = api_config.openai_api_key().ok_or_else(|| {
        std::io::Error::other(
            "No OpenAI API key configured; set api_keys.openai_api_key or OPENAI_API_KEY",
        )
    })?;

    let openai_client = OpenAIClient::new(api_key)
        .map_err(|e| std::io::Error::other(format!("Failed to create LLM client: {}", e)))?
        .with_model(api_config.model());
    let llm_client: Arc<dyn LlmClient> = Arc::new(openai_client);
    let storage = Arc::new(InMemoryStorage::new());
    let tool_executor = Arc::new(ToolExecutor::new());

    let allowed_origins = api_config
        .cors
        .as_ref()
        .map(|c| c.allowed_origins.clone())
        .unwrap_or_default();

    let bind_addr = format!("{}:{}", api_config.server.host, api_config.server.port);
    info!(
        model = %api_config.model(),
        "Starting finagent-api server at http://{}", bind_addr
    );

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(llm_client.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(tool_executor.clone()))
            .service(handlers::health::health)
            .service(handlers::chat::chat)
            .service(handlers::sessions::get_session)
            .service(handlers::sessions::list_sessions)
    })
    .bind(bind_addr)?
    .run()
    .await
}
