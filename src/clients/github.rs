use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use url::Url;

use super::PullRequestSource;
use crate::errors::GitHubError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("article-checker/", env!("CARGO_PKG_VERSION"));
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";

/// Pull request 标识以及 API 返回的基本信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    /// 调用方传入的原始 URL，同时作为 diff 缓存键的来源
    pub url: String,
    pub title: Option<String>,
}

impl PullRequest {
    /// Parse `https://<host>/<owner>/<repo>/pull/<n>[/...]`.
    ///
    /// Segments are matched by position, so an owner or repo literally named
    /// `pull` is accepted.
    pub fn parse_url(url: &str) -> Result<Self, GitHubError> {
        let invalid = || GitHubError::InvalidPullUrl(url.to_string());

        let parsed = Url::parse(url).map_err(|_| invalid())?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|s| !s.is_empty())
            .collect();

        let [owner, repo, "pull", number, ..] = segments.as_slice() else {
            return Err(invalid());
        };
        let number = number.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            url: url.to_string(),
            title: None,
        })
    }
}

#[derive(Deserialize)]
struct PullResponse {
    title: Option<String>,
}

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_url: String,
    token: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(token: String) -> Self {
        Self::with_api_url(token, DEFAULT_API_URL.to_string())
    }

    pub fn with_api_url(token: String, api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn pull_endpoint(&self, pr: &PullRequest) -> String {
        format!("{}/repos/{}/{}/pulls/{}", self.api_url, pr.owner, pr.repo, pr.number)
    }

    fn comments_endpoint(&self, pr: &PullRequest) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn authorized(&self, builder: RequestBuilder, accept: &str) -> RequestBuilder {
        builder
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, accept)
            .header(header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn check_status(
        response: reqwest::Response,
        pr: &PullRequest,
    ) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHubError::Authentication,
            StatusCode::NOT_FOUND => GitHubError::NotFound(pr.url.clone()),
            s => GitHubError::Api {
                status: s.as_u16(),
                message: response.text().await.unwrap_or_default(),
            },
        })
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_pull_request(&self, url: &str) -> Result<PullRequest, GitHubError> {
        let mut pr = PullRequest::parse_url(url)?;
        let response = self
            .authorized(self.client.get(self.pull_endpoint(&pr)), ACCEPT_JSON)
            .send()
            .await?;
        let response = Self::check_status(response, &pr).await?;
        let body: PullResponse = response.json().await?;
        pr.title = body.title;

        tracing::info!(owner = %pr.owner, repo = %pr.repo, number = pr.number, "Pull request found");
        Ok(pr)
    }

    async fn fetch_diff(&self, pr: &PullRequest) -> Result<String, GitHubError> {
        let response = self
            .authorized(self.client.get(self.pull_endpoint(pr)), ACCEPT_DIFF)
            .send()
            .await?;
        let response = Self::check_status(response, pr).await?;
        Ok(response.text().await?)
    }

    async fn create_issue_comment(&self, pr: &PullRequest, body: &str) -> Result<(), GitHubError> {
        let response = self
            .authorized(self.client.post(self.comments_endpoint(pr)), ACCEPT_JSON)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        Self::check_status(response, pr).await?;
        Ok(())
    }
}
