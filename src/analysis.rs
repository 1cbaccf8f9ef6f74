// LLM 分析编排
// 先查缓存；未命中时调用带检索的模型，失败则降级为固定提示文本

use crate::cache::{Cache, CacheNamespace};
use crate::clients::{RetrievalClient, RetrievalRequest};
use crate::config::CheckerConfig;
use crate::errors::AnalysisError;
use crate::logging::OperationTimer;

/// 降级文本，远程分析失败时使用
pub const FALLBACK_RESPONSE: &str = "⚠️ LLM API Error. Performing basic validation check instead.\n\nSummary of issues based on automated checks above.\n";

/// 缓存键只取文章前 1000 个字符
pub const CACHE_KEY_CHARS: usize = 1000;

const REVIEW_PROMPT: &str = include_str!("../assets/prompts/article-review.md");

/// 分析结果的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Cache,
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub content: String,
    pub source: AnalysisSource,
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.source == AnalysisSource::Fallback
    }
}

/// Cache key for an article's analysis.
pub fn analysis_cache_key(text: &str) -> String {
    let prefix: String = text.chars().take(CACHE_KEY_CHARS).collect();
    Cache::key(CacheNamespace::Llm, &prefix)
}

/// 把文章填入评审提示词模板
pub fn render_prompt(text: &str) -> String {
    REVIEW_PROMPT.replace("{article}", text)
}

/// Runs the cached, fault-tolerant LLM review of one article.
pub struct ArticleAnalyzer<'a> {
    client: &'a dyn RetrievalClient,
    cache: &'a Cache,
    config: &'a CheckerConfig,
}

impl<'a> ArticleAnalyzer<'a> {
    pub fn new(client: &'a dyn RetrievalClient, cache: &'a Cache, config: &'a CheckerConfig) -> Self {
        Self { client, cache, config }
    }

    /// Never fails: remote errors become [`FALLBACK_RESPONSE`].
    ///
    /// Fallback text is cached exactly like a real answer, so an outage can
    /// be replayed until the entry expires.
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let key = analysis_cache_key(text);

        if let Some(cached) = self.cache.load(CacheNamespace::Llm, &key) {
            if !cached.is_empty() {
                tracing::info!("Using cached LLM response");
                return AnalysisResult {
                    content: cached,
                    source: AnalysisSource::Cache,
                };
            }
        }

        tracing::info!(model = %self.config.model, "Running LLM analysis...");
        let result = match self.call_remote(text).await {
            Ok(content) => AnalysisResult {
                content,
                source: AnalysisSource::Remote,
            },
            Err(e) => {
                tracing::error!("Error in API call: {}", e);
                AnalysisResult {
                    content: FALLBACK_RESPONSE.to_string(),
                    source: AnalysisSource::Fallback,
                }
            }
        };

        self.cache.store(CacheNamespace::Llm, &key, &result.content);
        result
    }

    async fn call_remote(&self, text: &str) -> Result<String, AnalysisError> {
        let request = RetrievalRequest {
            query: render_prompt(text),
            model: self.config.model.clone(),
            n_search_results_to_use: self.config.search_results_to_use,
            max_searches_to_try: self.config.max_searches_to_try,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let timer = OperationTimer::new("llm_analysis").with_metadata("model", &request.model);
        let response = self.client.completion_with_retrieval(&request).await;
        timer.finish();

        let response = response?;
        if response.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(response)
    }
}
