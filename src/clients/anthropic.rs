//! Claude client with a web-search tool.
//!
//! The model may call the `search` tool up to the request's search budget;
//! every call is answered with Brave results, and once the budget is spent
//! the model is required to answer in text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{RetrievalClient, RetrievalRequest, SearchTool};
use crate::errors::AnalysisError;

/// Default Anthropic API endpoint
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const SEARCH_TOOL_NAME: &str = "search";

const SYSTEM_PROMPT: &str = "You review research articles before publication. \
You can call the `search` tool to check facts, figures and sources against the web. \
Search only when it helps to verify a concrete claim, then answer in Markdown.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

impl MessagesResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn wants_search(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
            && self
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// 回传给 API 的 assistant 内容，去掉无法识别的块
    fn replayable_content(&self) -> Vec<&ContentBlock> {
        self.content
            .iter()
            .filter(|b| !matches!(b, ContentBlock::Other))
            .collect()
    }
}

/// Retrieval-augmented Claude client.
pub struct ClaudeRetriever {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    search_tool: Box<dyn SearchTool>,
}

impl ClaudeRetriever {
    pub fn new(api_key: String, search_tool: Box<dyn SearchTool>) -> Self {
        Self::with_endpoint(api_key, ANTHROPIC_API_URL.to_string(), search_tool)
    }

    pub fn with_endpoint(api_key: String, endpoint: String, search_tool: Box<dyn SearchTool>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
            search_tool,
        }
    }

    fn build_request_body(
        &self,
        request: &RetrievalRequest,
        messages: &[Value],
        allow_search: bool,
    ) -> Value {
        let mut body = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": SYSTEM_PROMPT,
            "messages": messages,
            "tools": [{
                "name": SEARCH_TOOL_NAME,
                "description": "Search the web and return the most relevant result snippets.",
                "input_schema": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "The search query"}
                    },
                    "required": ["query"]
                }
            }],
        });
        if !allow_search {
            body["tool_choice"] = json!({"type": "none"});
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<MessagesResponse, AnalysisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ApiResponse {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// 执行一次搜索，失败时把错误文本交给模型
    async fn run_search(&self, input: &Value, max_results: u32) -> (String, bool) {
        let Some(query) = input.get("query").and_then(|q| q.as_str()) else {
            return ("Missing required parameter: query".to_string(), true);
        };

        match self.search_tool.search(query, max_results).await {
            Ok(results) if results.is_empty() => ("No results found.".to_string(), false),
            Ok(results) => (
                results
                    .iter()
                    .map(|r| r.render())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
                false,
            ),
            Err(e) => {
                tracing::warn!(query, "Search failed: {}", e);
                (e.to_string(), true)
            }
        }
    }
}

#[async_trait]
impl RetrievalClient for ClaudeRetriever {
    async fn completion_with_retrieval(
        &self,
        request: &RetrievalRequest,
    ) -> Result<String, AnalysisError> {
        let mut messages = vec![json!({"role": "user", "content": request.query})];
        let mut searches = 0u32;

        loop {
            let allow_search = searches < request.max_searches_to_try;
            let body = self.build_request_body(request, &messages, allow_search);
            let response = self.send(&body).await?;

            if allow_search && response.wants_search() {
                messages.push(json!({"role": "assistant", "content": response.replayable_content()}));

                let mut results = Vec::new();
                for block in &response.content {
                    let ContentBlock::ToolUse { id, name, input } = block else {
                        continue;
                    };
                    // 每个 tool_use 块都计入预算，未知工具也不例外
                    let (content, is_error) = if searches >= request.max_searches_to_try {
                        ("Search budget exhausted.".to_string(), true)
                    } else {
                        searches += 1;
                        if name == SEARCH_TOOL_NAME {
                            self.run_search(input, request.n_search_results_to_use).await
                        } else {
                            (format!("Unknown tool: {name}"), true)
                        }
                    };
                    results.push(json!({
                        "type": "tool_result",
                        "tool_use_id": id,
                        "content": content,
                        "is_error": is_error,
                    }));
                }
                tracing::debug!(searches, "Search round completed");
                messages.push(json!({"role": "user", "content": results}));
                continue;
            }

            let answer = response.text();
            if answer.trim().is_empty() {
                return Err(AnalysisError::EmptyResponse);
            }
            return Ok(answer);
        }
    }
}
