mod advisor;
mod analysis;
mod config;
mod document;
mod errors;
mod llm_client;
mod nlp;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisPipeline;
use crate::config::Config;
use crate::document::FormatExtractor;
use crate::llm_client::GeminiClient;
use crate::nlp::{
    BertEmbedder, BertEntityRecognizer, DisabledRecognizer, LazyModel, SimilarityScorer,
    SkillExtractor, SkillVocabulary,
};
use crate::nlp::{EntityRecognizer, TextEmbedder};
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

    info!("Starting Skill Gap API v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary
    let vocabulary = match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::from_file(path)?,
        None => SkillVocabulary::default(),
    };
    info!("Skill vocabulary loaded ({} terms)", vocabulary.len());

    // Sentence embedder, loaded on first use
    let embedder = {
        let model_id = config.embedding_model.clone();
        let revision = config.embedding_revision.clone();
        Arc::new(LazyModel::new(format!("embedding ({model_id})"), move || {
            BertEmbedder::load(&model_id, &revision)
        }))
    };

    // Entity recognizer, loaded on first use unless disabled
    let recognizer: Arc<dyn EntityRecognizer> = match &config.ner_model {
        Some(model_id) => {
            let model_id = model_id.clone();
            let revision = config.ner_revision.clone();
            let ner = Arc::new(LazyModel::new(format!("NER ({model_id})"), move || {
                BertEntityRecognizer::load(&model_id, &revision)
            }));
            if config.preload_models {
                preload(ner.clone()).await;
            }
            ner as Arc<dyn EntityRecognizer>
        }
        None => {
            info!("NER disabled, skill extraction uses the vocabulary only");
            Arc::new(DisabledRecognizer)
        }
    };

    if config.preload_models {
        preload(embedder.clone()).await;
    }
    let embedder: Arc<dyn TextEmbedder> = embedder;

    // Initialize LLM client
    let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    info!("LLM client initialized (model: {})", llm.model());

    let pipeline = AnalysisPipeline::new(
        Arc::new(FormatExtractor),
        SkillExtractor::new(vocabulary, recognizer),
        SimilarityScorer::new(embedder),
        Arc::new(llm),
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads a model off the async runtime. A failure is logged and left for the
/// first request to retry.
async fn preload<M: Send + Sync + 'static>(model: Arc<LazyModel<M>>) {
    let result = tokio::task::spawn_blocking(move || model.get().map(|_| ())).await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Model preload failed: {e}"),
        Err(e) => warn!("Model preload task panicked: {e}"),
    }
}
