// Pull request diff 获取
// 先按 PR URL 查 diff 缓存，未命中再请求 GitHub

use super::parser::{parse_diff, strip_added_markers, FileDiff};
use crate::cache::{Cache, CacheNamespace};
use crate::clients::{PullRequest, PullRequestSource};
use crate::errors::{CacheError, CheckerError};
use crate::logging::OperationTimer;

/// Return the parsed diff of `pr`, from cache when fresh.
///
/// A cached payload that no longer deserialises is treated as a miss.
pub async fn acquire_diff(
    source: &dyn PullRequestSource,
    cache: &Cache,
    pr: &PullRequest,
) -> Result<Vec<FileDiff>, CheckerError> {
    let key = Cache::key(CacheNamespace::Diff, &pr.url);

    if let Some(cached) = cache.load(CacheNamespace::Diff, &key) {
        match serde_json::from_str::<Vec<FileDiff>>(&cached) {
            Ok(files) => {
                tracing::info!(files = files.len(), "Using cached PR diff");
                return Ok(files);
            }
            Err(e) => {
                tracing::warn!("{}", CacheError::Corrupt(key.clone(), e));
            }
        }
    }

    tracing::info!(url = %pr.url, "Fetching PR diff...");
    let timer = OperationTimer::new("diff_fetch").with_metadata("pull", &pr.number.to_string());
    let raw = source.fetch_diff(pr).await?;
    timer.finish();

    let files = parse_diff(&raw);
    match serde_json::to_string(&files) {
        Ok(payload) => cache.store(CacheNamespace::Diff, &key, &payload),
        Err(e) => tracing::warn!("Could not serialize diff for cache: {}", e),
    }
    Ok(files)
}

/// Build the reviewed text from the first changed file.
///
/// The text is the entry's header plus its first hunk with added-line
/// markers removed. An entry without hunks degrades to a best-effort
/// rendering instead of failing.
pub fn extract_article_text(files: &[FileDiff], pull_url: &str) -> Result<String, CheckerError> {
    let first = files
        .first()
        .ok_or_else(|| CheckerError::EmptyDiff(pull_url.to_string()))?;

    match first.hunks.first() {
        Some(hunk) => Ok(strip_added_markers(&format!("{}{}", first.header, hunk.body))),
        None => {
            tracing::warn!(path = %first.path, "Error processing diff: first entry has no hunks");
            Ok(format!("{}{:?}", first.header, first.hunks))
        }
    }
}
