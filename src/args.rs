use clap::Parser;
use std::path::PathBuf;

use crate::clients::github::DEFAULT_API_URL;
use crate::config::DEFAULT_CONFIG_PATH;

pub const DEFAULT_CACHE_DIR: &str = "/tmp/article_checker_cache";

/// 检查 PR 中新增的研究文章是否符合要求
#[derive(Parser, Debug, Clone)]
#[command(name = "article-checker", version)]
#[command(about = "Validate a research article pull request and post an LLM review")]
pub struct Args {
    /// GitHub token
    #[arg(long)]
    pub github_token: String,

    /// LLM API key
    #[arg(long = "llm-api-key")]
    pub llm_api_key: String,

    /// GitHub pull URL
    #[arg(long)]
    pub pull_url: String,

    /// API key for the search engine
    #[arg(long)]
    pub search_api_key: String,

    /// Directory for caching results
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// JSON file with model settings
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// GitHub API base URL (GitHub Enterprise)
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}
