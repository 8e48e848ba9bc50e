pub mod handlers;
mod multipart;
pub mod types;

pub use handlers::AppState;
pub use multipart::{UploadForm, read_upload_form};

use crate::{
    Result, config::Config, documents::DocxExtractor, llm::create_model_client,
    uploads::UploadStore,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/generate-text", post(handlers::generate_text))
        .route("/generate-from-image", post(handlers::generate_from_image))
        .route("/generate-from-document", post(handlers::generate_from_document))
        .route("/generate-from-audio", post(handlers::generate_from_audio))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    if !config.llm.has_api_key() {
        warn!("No model API key configured; model calls will be rejected by the provider");
    }

    // Initialize staging directory
    let uploads = UploadStore::new(&config.server.upload_dir);
    uploads.ensure_dir().await?;
    info!("Staging uploads in {}", uploads.dir().display());

    // Create application state
    let app_state = AppState {
        model: create_model_client(&config.llm),
        extractor: Arc::new(DocxExtractor::new(config.server.max_document_bytes)),
        uploads,
    };

    let app = router(app_state, config.server.max_upload_bytes);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Generative AI relay is running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
