//! The question-answering service.
//!
//! Owns the site corpus for the lifetime of the process. The corpus is
//! crawled exactly once in [`QaService::bootstrap`]; afterwards it is shared
//! read-only and every request works on its own trimmed copy.

use std::sync::Arc;

use sitesage_config::AppConfig;
use sitesage_core::{
    AskError, CrawlError, PageMap, Provider, ProviderRequest, Question, SiteCorpus,
};
use sitesage_crawler::SiteCrawler;
use tracing::{Instrument, info, info_span, warn};
use url::Url;

use crate::answer::{AnswerResult, assemble};
use crate::budget::BudgetEnforcer;
use crate::prompt;

/// Per-process settings for answering questions.
#[derive(Debug, Clone)]
pub struct QaSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Budget for the serialized site data, in characters.
    pub max_context_chars: usize,
}

impl QaSettings {
    pub fn from_config(config: &AppConfig, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: config.default_temperature,
            max_tokens: config.default_max_tokens,
            max_context_chars: config.site.max_context_chars,
        }
    }
}

/// Answers questions about one crawled site.
pub struct QaService {
    corpus: Arc<SiteCorpus>,
    provider: Arc<dyn Provider>,
    enforcer: BudgetEnforcer,
    settings: QaSettings,
}

impl QaService {
    pub fn new(corpus: Arc<SiteCorpus>, provider: Arc<dyn Provider>, settings: QaSettings) -> Self {
        Self {
            enforcer: BudgetEnforcer::new(settings.max_context_chars),
            corpus,
            provider,
            settings,
        }
    }

    /// Startup phase: crawl the site once, then build the service.
    ///
    /// A failed or empty crawl is an error; the service never starts with a
    /// missing corpus.
    pub async fn bootstrap(
        crawler: &dyn SiteCrawler,
        base_url: &Url,
        provider: Arc<dyn Provider>,
        settings: QaSettings,
    ) -> Result<Self, CrawlError> {
        info!(site = %base_url, "Crawling site");
        let corpus = crawler.crawl(base_url).await?;
        if corpus.is_empty() {
            return Err(CrawlError::EmptySite(base_url.to_string()));
        }

        let service = Self::new(Arc::new(corpus), provider, settings);
        let size = crate::budget::serialized_size(service.sources());
        info!(
            pages = service.corpus.len(),
            serialized_chars = size,
            budget = service.enforcer.max_chars(),
            "Site corpus ready"
        );
        if size > service.enforcer.max_chars() {
            warn!("Site data exceeds the context budget; every question will use a trimmed subset");
        }

        Ok(service)
    }

    pub fn corpus(&self) -> &SiteCorpus {
        &self.corpus
    }

    /// Describe known sources: the full, untrimmed corpus.
    pub fn sources(&self) -> &PageMap {
        self.corpus.pages()
    }

    pub fn settings(&self) -> &QaSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validate a raw question and answer it.
    pub async fn ask(&self, raw: &str) -> Result<AnswerResult, AskError> {
        let question = Question::validate(raw)?;
        self.answer(question).await
    }

    /// Answer an already validated question.
    pub async fn answer(&self, question: Question) -> Result<AnswerResult, AskError> {
        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("ask", %request_id, question_chars = question.as_str().chars().count());
        self.answer_inner(question).instrument(span).await
    }

    async fn answer_inner(&self, question: Question) -> Result<AnswerResult, AskError> {
        let trimmed = self.enforcer.enforce(self.corpus.pages());
        let messages = prompt::build_messages(self.corpus.site(), &trimmed.pages, &question);

        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        info!(
            provider = %self.provider.name(),
            model = %request.model,
            sources = trimmed.pages.len(),
            evicted = trimmed.evicted.len(),
            context_chars = trimmed.size,
            "Asking model"
        );

        let response = self.provider.complete(request).await.map_err(|e| {
            warn!(error = %e, "LLM call failed");
            AskError::Upstream(e)
        })?;

        let result = assemble(&question, &trimmed.pages, response.into());
        match &result {
            Ok(answer) => info!(
                input_tokens = ?answer.usage.input_tokens,
                output_tokens = ?answer.usage.output_tokens,
                "Answered"
            ),
            Err(e) => warn!(error = %e, "Model refused to answer"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sitesage_core::{CorpusEntry, Message, ProviderError, ProviderResponse, QuestionError, Usage};
    use std::sync::Mutex;

    /// Replies with a fixed response and records every request.
    struct RecordingProvider {
        reply: Result<ProviderResponse, ProviderError>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl RecordingProvider {
        fn answering(text: &str) -> Self {
            Self::with(Ok(ProviderResponse {
                message: Message::assistant(text),
                refusal: None,
                usage: Some(Usage {
                    prompt_tokens: Some(50),
                    completion_tokens: Some(8),
                    total_tokens: Some(58),
                }),
                model: "mock".into(),
            }))
        }

        fn with(reply: Result<ProviderResponse, ProviderError>) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ProviderRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    struct FixedCrawler(Result<Vec<CorpusEntry>, CrawlError>);

    #[async_trait]
    impl SiteCrawler for FixedCrawler {
        async fn crawl(&self, base_url: &Url) -> Result<SiteCorpus, CrawlError> {
            let entries = self.0.clone()?;
            Ok(SiteCorpus::from_entries(base_url.as_str(), entries))
        }
    }

    fn settings(max_context_chars: usize) -> QaSettings {
        QaSettings {
            model: "gpt-4o-mini".into(),
            temperature: None,
            max_tokens: None,
            max_context_chars,
        }
    }

    fn corpus() -> Arc<SiteCorpus> {
        Arc::new(SiteCorpus::from_entries(
            "https://s.test/",
            vec![
                CorpusEntry::new("a", "x".repeat(100)),
                CorpusEntry::new("b", "y".repeat(50)),
            ],
        ))
    }

    #[tokio::test]
    async fn answers_with_full_corpus_when_it_fits() {
        let provider = Arc::new(RecordingProvider::answering("Fine."));
        let service = QaService::new(corpus(), provider.clone(), settings(196_000));

        let result = service.ask("What is here?").await.unwrap();
        assert_eq!(result.answer_text, "Fine.");
        assert_eq!(result.sources, vec!["a", "b"]);
        assert_eq!(result.usage.input_tokens, Some(50));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert!(requests[0].messages[1].content.contains(&"x".repeat(100)));
    }

    #[tokio::test]
    async fn trims_to_budget_and_reports_only_sent_sources() {
        let provider = Arc::new(RecordingProvider::answering("Partial."));
        let service = QaService::new(corpus(), provider.clone(), settings(120));

        let result = service.ask("What is here?").await.unwrap();
        assert_eq!(result.sources, vec!["b"]);

        let prompt = &provider.requests()[0].messages[1].content;
        assert!(!prompt.contains(&"x".repeat(100)));
        assert!(prompt.contains(&"y".repeat(50)));

        // The shared corpus is untouched.
        assert_eq!(service.sources().len(), 2);
    }

    #[tokio::test]
    async fn invalid_question_never_reaches_the_model() {
        let provider = Arc::new(RecordingProvider::answering("unused"));
        let service = QaService::new(corpus(), provider.clone(), settings(196_000));

        let err = service.ask(&"q".repeat(501)).await.unwrap_err();
        assert!(matches!(
            err,
            AskError::InvalidQuestion(QuestionError::TooLong { .. })
        ));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn refusal_is_surfaced() {
        let provider = Arc::new(RecordingProvider::with(Ok(ProviderResponse {
            message: Message::assistant(""),
            refusal: Some("Cannot answer.".into()),
            usage: None,
            model: "mock".into(),
        })));
        let service = QaService::new(corpus(), provider, settings(196_000));
        let err = service.ask("Anything?").await.unwrap_err();
        assert!(matches!(err, AskError::Refused { .. }));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn upstream_failure_is_propagated() {
        let provider = Arc::new(RecordingProvider::with(Err(ProviderError::Timeout(
            "120s".into(),
        ))));
        let service = QaService::new(corpus(), provider, settings(196_000));
        let err = service.ask("Anything?").await.unwrap_err();
        assert!(matches!(err, AskError::Upstream(ProviderError::Timeout(_))));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn bootstrap_builds_corpus_once() {
        let crawler = FixedCrawler(Ok(vec![CorpusEntry::new("https://s.test/", "home")]));
        let base = Url::parse("https://s.test/").unwrap();
        let service = QaService::bootstrap(
            &crawler,
            &base,
            Arc::new(RecordingProvider::answering("ok")),
            settings(196_000),
        )
        .await
        .unwrap();
        assert_eq!(service.corpus().site(), "https://s.test/");
        assert_eq!(service.sources().len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_fails_on_crawl_error() {
        let crawler = FixedCrawler(Err(CrawlError::Fetch {
            url: "https://s.test/".into(),
            reason: "connection refused".into(),
        }));
        let base = Url::parse("https://s.test/").unwrap();
        let result = QaService::bootstrap(
            &crawler,
            &base,
            Arc::new(RecordingProvider::answering("ok")),
            settings(196_000),
        )
        .await;
        assert!(matches!(result, Err(CrawlError::Fetch { .. })));
    }

    #[tokio::test]
    async fn bootstrap_fails_on_empty_crawl() {
        let crawler = FixedCrawler(Ok(vec![]));
        let base = Url::parse("https://s.test/").unwrap();
        let result = QaService::bootstrap(
            &crawler,
            &base,
            Arc::new(RecordingProvider::answering("ok")),
            settings(196_000),
        )
        .await;
        assert!(matches!(result, Err(CrawlError::EmptySite(_))));
    }

    #[tokio::test]
    async fn concurrent_questions_are_independent() {
        let provider = Arc::new(RecordingProvider::answering("Same."));
        let service = Arc::new(QaService::new(corpus(), provider.clone(), settings(120)));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.ask(&format!("Question {i}?")).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.sources, vec!["b"]);
        }
        assert_eq!(provider.requests().len(), 8);
    }
}
