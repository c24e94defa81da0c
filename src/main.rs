//! Persona Advisor server entry point.
//!
//! Loads configuration from the environment, reads the catalog, picks the
//! generation service and serves the HTTP API.

use std::sync::Arc;

use axum::http::HeaderValue;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use persona_advisor::adapters::ai::{GeminiConfig, GeminiProvider, MockGenerationService, MockScript};
use persona_advisor::adapters::catalog::YamlCatalog;
use persona_advisor::adapters::http::{router, AppState};
use persona_advisor::application::{StreamConsumer, TurnDriver};
use persona_advisor::config::{
    AppConfig, ConfigError, GenerationConfig, GenerationProvider, ServerConfig, ValidationError,
};
use persona_advisor::ports::{CatalogError, GenerationError, GenerationService};

const OFFLINE_REPLY: &str = "I'm running without a language model right now, so I can only \
    give this placeholder answer.\
    [SUGGESTION]Tell me more about this school[/SUGGESTION]\
    [SUGGESTION]Which persona suits me?[/SUGGESTION]";

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("generation service: {0}")]
    Generation(#[from] GenerationError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate().map_err(ConfigError::from)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Persona Advisor starting"
    );

    let catalog = Arc::new(YamlCatalog::load(&config.catalog.path)?);
    let service = generation_service(&config.generation)?;
    tracing::info!(provider = service.name(), "Generation service ready");

    let mut consumer = StreamConsumer::new();
    if let Some(deadline) = config.generation.turn_deadline() {
        consumer = consumer.with_deadline(deadline);
    }
    let driver = TurnDriver::new(service).with_consumer(consumer);

    let state = AppState::new(
        catalog,
        driver,
        config.conversation.session_defaults(),
        config.conversation.default_max_recommended,
    );
    state
        .sessions
        .spawn_idle_sweeper(config.conversation.idle_timeout());

    let app = router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr().map_err(ConfigError::from)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over the
/// configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn generation_service(
    config: &GenerationConfig,
) -> Result<Arc<dyn GenerationService>, StartupError> {
    match config.provider {
        GenerationProvider::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .ok_or(ConfigError::ValidationFailed(ValidationError::MissingRequired(
                    "GENERATION__API_KEY",
                )))?;
            let provider = GeminiProvider::new(
                GeminiConfig::from_secret(api_key)
                    .with_model(&config.model)
                    .with_base_url(&config.base_url)
                    .with_timeout(config.timeout()),
            )?;
            Ok(Arc::new(provider))
        }
        GenerationProvider::Mock => {
            tracing::warn!("Using the offline mock generation service");
            Ok(Arc::new(
                MockGenerationService::new().with_fallback(MockScript::fragments([OFFLINE_REPLY])),
            ))
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        if config.is_production() {
            tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
            return CorsLayer::new();
        }
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
