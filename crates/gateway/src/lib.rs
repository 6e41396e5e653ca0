//! HTTP API gateway for SiteSage.
//!
//! Exposes the question-answering service over REST:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /source_info` | Full crawled corpus, `url → text` |
//! | `POST /ask` | Answer a plain-text question |
//! | `GET /health` | Liveness and corpus size |
//! | `GET /openapi.json` | Static OpenAPI document |
//!
//! Built on Axum. The corpus is crawled once in [`prepare`], before the
//! listener is bound.

pub mod openapi;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::BytesRejection;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use sitesage_config::AppConfig;
use sitesage_core::{AskError, MAX_QUESTION_CHARS, PageMap, Question, QuestionError};
use sitesage_crawler::{CrawlOptions, HttpCrawler};
use sitesage_qa::{AnswerResult, QaService, QaSettings};

/// Largest accepted request body. Questions are capped far lower; this only
/// stops oversized uploads before they are buffered.
const MAX_BODY_BYTES: usize = 16 * 1024;

type SharedState = Arc<QaService>;

/// Build the Axum router with all gateway routes.
pub fn build_router(service: Arc<QaService>) -> Router {
    Router::new()
        .route("/source_info", get(source_info_handler))
        .route("/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .route("/openapi.json", get(openapi::openapi_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(service)
}

/// Startup phase: resolve the site, build the provider, crawl once.
///
/// Fails fast on a missing or invalid base URL and on a failed crawl; the
/// gateway never serves without a corpus.
pub async fn prepare(config: &AppConfig) -> Result<Arc<QaService>, Box<dyn std::error::Error>> {
    let base_url = config.base_url()?;

    if !config.has_api_key() {
        warn!(
            provider = %config.default_provider,
            "No API key configured; requests will fail unless the provider needs none"
        );
    }

    let provider = sitesage_providers::build_from_config(config)?;
    let settings = QaSettings::from_config(config, sitesage_providers::model_for(config));

    let crawler = HttpCrawler::new(CrawlOptions::from(&config.crawler))?;
    let service = QaService::bootstrap(&crawler, &base_url, provider, settings).await?;

    Ok(Arc::new(service))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = prepare(&config).await?;

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(service.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        site = %service.corpus().site(),
        pages = service.corpus().len(),
        "Gateway listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Errors ---

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// A failed `/ask`, rendered as `{"detail": ...}`.
enum ApiError {
    Ask(AskError),
    /// The body could not be read for a reason other than its size.
    Body(BytesRejection),
}

impl From<AskError> for ApiError {
    fn from(err: AskError) -> Self {
        Self::Ask(err)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        // Anything over the body cap is far over the question cap too.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::Ask(AskError::InvalidQuestion(QuestionError::TooLong {
                length: MAX_BODY_BYTES + 1,
                max: MAX_QUESTION_CHARS,
            }));
        }
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Ask(err) => {
                let status = match &err {
                    AskError::InvalidQuestion(_) | AskError::Refused { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    AskError::Upstream(_) => StatusCode::BAD_GATEWAY,
                };
                if status.is_server_error() {
                    error!(error = %err, "Ask failed");
                }
                (status, err.to_string())
            }
            Self::Body(rejection) => (rejection.status(), rejection.body_text()),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

// --- Handlers ---

async fn source_info_handler(State(service): State<SharedState>) -> Json<PageMap> {
    Json(service.sources().clone())
}

#[derive(Serialize)]
struct AskResponse {
    response: AnswerResult,
}

async fn ask_handler(
    State(service): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let body = body?;
    let question = Question::from_bytes(&body).map_err(AskError::from)?;
    let response = service.answer(question).await?;
    Ok(Json(AskResponse { response }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    site: String,
    pages: usize,
}

async fn health_handler(State(service): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        site: service.corpus().site().to_string(),
        pages: service.corpus().len(),
    })
}
