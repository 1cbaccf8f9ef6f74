use std::path::PathBuf;
use thiserror::Error;

/// 进程退出码：源代码托管平台不可达或无法取得 diff
pub const EXIT_SOURCE_CONTROL: i32 = 1;
/// 进程退出码：diff 中没有任何变更文件（2 留给 clap 的参数错误）
pub const EXIT_EMPTY_DIFF: i32 = 3;

/// 顶层错误，只有取不到文章文本的错误才会走到这里
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("GitHub access error: {0}")]
    GitHub(#[from] GitHubError),
    #[error("No diff content found for {0}")]
    EmptyDiff(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl CheckerError {
    /// 映射到进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckerError::EmptyDiff(_) => EXIT_EMPTY_DIFF,
            _ => EXIT_SOURCE_CONTROL,
        }
    }
}

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Invalid pull request URL: {0}")]
    InvalidPullUrl(String),
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Authentication failed: invalid token")]
    Authentication,
    #[error("Pull request {0} not found")]
    NotFound(String),
    #[error("GitHub API responded with {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse JSON config '{0}': {1}")]
    JsonParse(PathBuf, #[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on cache file '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Cached payload '{0}' is not usable: {1}")]
    Corrupt(String, #[source] serde_json::Error),
}

/// LLM 与检索调用的错误，编排层会把它们转换为降级文本
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("LLM request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("LLM API responded with error {status}: {message}")]
    ApiResponse { status: u16, message: String },
    #[error("No response from API")]
    EmptyResponse,
    #[error("Search failed: {0}")]
    Search(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let empty = CheckerError::EmptyDiff("https://github.com/o/r/pull/1".to_string());
        let auth = CheckerError::GitHub(GitHubError::Authentication);
        assert_eq!(empty.exit_code(), 3);
        assert_eq!(auth.exit_code(), EXIT_SOURCE_CONTROL);
        assert_ne!(empty.exit_code(), auth.exit_code());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::EmptyResponse;
        assert_eq!(err.to_string(), "No response from API");

        let err = GitHubError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
    }
}
