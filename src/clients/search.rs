use async_trait::async_trait;
use reqwest::{header, Client};

use super::SearchTool;
use crate::errors::AnalysisError;

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// 搜索结果条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchResult {
    /// 渲染为交给模型的文本块
    pub fn render(&self) -> String {
        format!("<title>{}</title>\n<url>{}</url>\n<content>{}</content>", self.title, self.url, self.snippet)
    }
}

/// Brave Search API client.
#[derive(Debug, Clone)]
pub struct BraveSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl BraveSearch {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, BRAVE_SEARCH_URL.to_string())
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl SearchTool for BraveSearch {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>, AnalysisError> {
        tracing::debug!(query, max_results, "Running web search");

        let count = max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", &self.api_key)
            .header(header::ACCEPT, "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| AnalysisError::Search(format!("Brave Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Search(format!(
                "Brave Search API error ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Search(format!("Failed to parse Brave Search response: {e}")))?;

        let results = data
            .get("web")
            .and_then(|w| w.get("results"))
            .and_then(|r| r.as_array())
            .map(|arr| {
                arr.iter()
                    .take(max_results as usize)
                    .map(|item| SearchResult {
                        title: item.get("title").and_then(|t| t.as_str()).unwrap_or("").to_string(),
                        url: item.get("url").and_then(|u| u.as_str()).unwrap_or("").to_string(),
                        snippet: item
                            .get("description")
                            .and_then(|d| d.as_str())
                            .unwrap_or("")
                            .to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_brave_search_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "okx reserves")
                    .query_param("count", "1")
                    .header("X-Subscription-Token", "brave-key");
                then.status(200).json_body(serde_json::json!({
                    "web": {"results": [
                        {"title": "OKX", "url": "https://okx.com", "description": "Proof of reserves"},
                        {"title": "Extra", "url": "https://example.com", "description": "ignored"}
                    ]}
                }));
            })
            .await;

        let search = BraveSearch::with_endpoint("brave-key".to_string(), server.url("/search"));
        let results = search.search("okx reserves", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "OKX");
        assert_eq!(results[0].snippet, "Proof of reserves");
    }

    #[tokio::test]
    async fn test_brave_search_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(429).body("rate limited");
            })
            .await;

        let search = BraveSearch::with_endpoint("k".to_string(), server.url("/search"));
        let err = search.search("q", 1).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Search(msg) if msg.contains("429")));
    }

    #[test]
    fn test_render() {
        let result = SearchResult {
            title: "t".to_string(),
            url: "u".to_string(),
            snippet: "s".to_string(),
        };
        assert_eq!(result.render(), "<title>t</title>\n<url>u</url>\n<content>s</content>");
    }
}
