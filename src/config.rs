use serde::Deserialize;
use std::{collections::HashMap, env, path::Path, time::Duration};

use crate::errors::ConfigError;

/// 默认配置文件位置（相对于内容仓库根目录）
pub const DEFAULT_CONFIG_PATH: &str = "tools/article_checker/config.json";

const ENV_MODEL: &str = "ARTICLE_CHECKER_MODEL";
const ENV_MAX_TOKENS: &str = "ARTICLE_CHECKER_MAX_TOKENS";
const ENV_TEMPERATURE: &str = "ARTICLE_CHECKER_TEMPERATURE";

/// Analysis configuration.
///
/// Built by [`CheckerConfig::load`], which tries the JSON file first and
/// falls back to [`CheckerConfig::default`]; environment variables override
/// whichever of the two was used.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// 每次搜索最多使用的结果数
    pub search_results_to_use: u32,
    /// 最多尝试的搜索次数
    pub max_searches_to_try: u32,
    pub cache_max_age_hours: u64,
}

/// JSON 文件中的字段，全部可选
#[derive(Deserialize, Debug, Default)]
pub struct PartialCheckerConfig {
    #[serde(rename = "ANTHROPIC_SEARCH_MODEL")]
    pub model: Option<String>,
    #[serde(rename = "ANTHROPIC_SEARCH_MAX_TOKENS")]
    pub max_tokens: Option<u32>,
    #[serde(rename = "ANTHROPIC_SEARCH_TEMPERATURE")]
    pub temperature: Option<f32>,
    #[serde(rename = "SEARCH_RESULTS_TO_USE")]
    pub search_results_to_use: Option<u32>,
    #[serde(rename = "MAX_SEARCHES_TO_TRY")]
    pub max_searches_to_try: Option<u32>,
    #[serde(rename = "CACHE_MAX_AGE_HOURS")]
    pub cache_max_age_hours: Option<u64>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            search_results_to_use: default_search_results_to_use(),
            max_searches_to_try: default_max_searches_to_try(),
            cache_max_age_hours: default_cache_max_age_hours(),
        }
    }
}

impl CheckerConfig {
    /// Load from `path`, substituting defaults when the file is unusable.
    pub fn load(path: &Path) -> Self {
        let env_map: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with("ARTICLE_CHECKER_"))
            .collect();

        let file_config = match Self::read_file(path) {
            Ok(partial) => {
                tracing::debug!(path = %path.display(), "Loaded checker config");
                Some(partial)
            }
            Err(e) => {
                tracing::warn!("Error loading config, using defaults: {}", e);
                None
            }
        };

        Self::from_env_or_file(file_config, &env_map)
    }

    /// 读取并解析 JSON 配置文件
    pub fn read_file(path: &Path) -> Result<PartialCheckerConfig, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::JsonParse(path.to_path_buf(), e))
    }

    /// Merge file values and environment overrides over the defaults.
    pub fn from_env_or_file(
        file_config: Option<PartialCheckerConfig>,
        env_map: &HashMap<String, String>,
    ) -> Self {
        let file = file_config.unwrap_or_default();

        let model = env_map
            .get(ENV_MODEL)
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .or(file.model)
            .unwrap_or_else(default_model);

        let max_tokens = env_map
            .get(ENV_MAX_TOKENS)
            .and_then(|s| s.parse().ok())
            .or(file.max_tokens)
            .unwrap_or_else(default_max_tokens);

        let temperature = env_map
            .get(ENV_TEMPERATURE)
            .and_then(|s| s.parse().ok())
            .or(file.temperature)
            .unwrap_or_else(default_temperature);

        Self {
            model,
            max_tokens,
            temperature,
            search_results_to_use: file
                .search_results_to_use
                .unwrap_or_else(default_search_results_to_use),
            max_searches_to_try: file
                .max_searches_to_try
                .unwrap_or_else(default_max_searches_to_try),
            cache_max_age_hours: file
                .cache_max_age_hours
                .unwrap_or_else(default_cache_max_age_hours),
        }
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_hours.saturating_mul(3600))
    }
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_search_results_to_use() -> u32 {
    1
}

fn default_max_searches_to_try() -> u32 {
    5
}

fn default_cache_max_age_hours() -> u64 {
    24
}
