//! Error types for the SiteSage domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all SiteSage operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Crawl errors ---
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    // --- Question answering ---
    #[error("Ask error: {0}")]
    Ask(#[from] AskError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    #[error("Invalid site URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Crawl of {0} produced no pages")]
    EmptySite(String),
}

/// Input constraint violations on an incoming question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("Question must not be empty")]
    Empty,

    #[error("Question exceeds maximum length of {max} characters")]
    TooLong { length: usize, max: usize },

    #[error("Question must be valid UTF-8 text")]
    NotUtf8,
}

/// Failures of the question-answering pipeline.
///
/// The first two are client errors; `Upstream` is a server-side failure
/// scoped to the single request that hit it.
#[derive(Debug, Clone, Error)]
pub enum AskError {
    #[error("{0}")]
    InvalidQuestion(#[from] QuestionError),

    #[error("The AI refused to answer the question based on the provided data.")]
    Refused { reason: Option<String> },

    #[error("Upstream LLM failure: {0}")]
    Upstream(#[from] ProviderError),
}

impl AskError {
    /// Whether the caller is at fault (as opposed to an upstream collaborator).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuestion(_) | Self::Refused { .. })
    }
}
