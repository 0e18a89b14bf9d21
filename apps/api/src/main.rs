mod ai;
mod config;
mod errors;
mod models;
mod ocr;
mod pdf;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::anthropic::AnthropicExtractor;
use crate::ai::openai::OpenAiEmbedder;
use crate::ai::provider::{Embedder, Extractor};
use crate::ai::{AiService, AiSettings};
use crate::config::Config;
use crate::ocr::{Recognizer, TesseractRecognizer};
use crate::resume::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume parser API v{}", env!("CARGO_PKG_VERSION"));

    let extractor: Arc<dyn Extractor> = Arc::new(AnthropicExtractor::new(
        config.anthropic_api_key.clone(),
        config.request_timeout,
    )?);
    info!("Extraction client initialized (model: {})", ai::anthropic::MODEL);

    let embedder: Option<Arc<dyn Embedder>> = match (&config.openai_api_key, config.generate_embeddings) {
        (Some(key), true) => {
            info!(
                "Embedding client initialized (model: {})",
                ai::openai::EMBEDDING_MODEL
            );
            Some(Arc::new(OpenAiEmbedder::new(
                key.clone(),
                config.request_timeout,
            )?))
        }
        _ => None,
    };

    let recognizer: Option<Arc<dyn Recognizer>> = if config.enable_ocr {
        info!("OCR fallback enabled (pdftoppm + tesseract)");
        Some(Arc::new(TesseractRecognizer::new()))
    } else {
        None
    };

    let ai_service = AiService::new(extractor, embedder, AiSettings::from(&config));
    let pipeline = Arc::new(Pipeline::new(config.clone(), ai_service, recognizer));

    let state = AppState { config: config.clone(), pipeline };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
