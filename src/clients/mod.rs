//! 外部服务客户端
//!
//! 流水线只依赖这里的 trait，GitHub、Claude 与 Brave 的具体实现可在测试中替换。

pub mod anthropic;
pub mod github;
pub mod search;

use async_trait::async_trait;

use crate::errors::{AnalysisError, GitHubError};

pub use anthropic::ClaudeRetriever;
pub use github::{GitHubClient, PullRequest};
pub use search::{BraveSearch, SearchResult};

/// Source-control side of the pipeline.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// 解析 URL 并确认 pull request 可访问
    async fn fetch_pull_request(&self, url: &str) -> Result<PullRequest, GitHubError>;

    /// 原始 unified diff 文本
    async fn fetch_diff(&self, pr: &PullRequest) -> Result<String, GitHubError>;

    async fn create_issue_comment(&self, pr: &PullRequest, body: &str) -> Result<(), GitHubError>;
}

/// Parameters of one retrieval-augmented completion.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalRequest {
    pub query: String,
    pub model: String,
    pub n_search_results_to_use: u32,
    pub max_searches_to_try: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// LLM client able to consult a search tool before answering.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    async fn completion_with_retrieval(
        &self,
        request: &RetrievalRequest,
    ) -> Result<String, AnalysisError>;
}

/// Web search used by the retrieval client.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>, AnalysisError>;
}
