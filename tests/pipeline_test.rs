// 流水线集成测试
//
// 使用实现了客户端 trait 的假对象驱动完整流程：
// 1. 合格文章：两项校验均通过
// 2. 缺少 entities：头部校验失败但流程继续
// 3. LLM 失败：降级文本写入缓存并在下次运行时重放
// 4. 空 diff / GitHub 不可达：返回致命错误与对应退出码
// 5. CI 环境中发布评论，发布失败不影响结果

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use article_checker::analysis::{AnalysisSource, FALLBACK_RESPONSE};
use article_checker::cache::{Cache, DEFAULT_MAX_AGE};
use article_checker::clients::{PullRequest, PullRequestSource, RetrievalClient, RetrievalRequest};
use article_checker::errors::{AnalysisError, CheckerError, GitHubError, EXIT_EMPTY_DIFF, EXIT_SOURCE_CONTROL};
use article_checker::report::{ExecutionContext, PostOutcome};
use article_checker::{ArticleChecker, CheckerConfig};

const PULL_URL: &str = "https://github.com/acme/research/pull/12";

fn article_diff(frontmatter: &[&str], body: &str) -> String {
    let mut lines = vec!["---".to_string()];
    lines.extend(frontmatter.iter().map(|l| l.to_string()));
    lines.push("---".to_string());
    let added: Vec<String> = lines
        .iter()
        .map(String::as_str)
        .chain(body.lines())
        .map(|l| format!("+{l}"))
        .collect();

    format!(
        "diff --git a/content/research/post.md b/content/research/post.md\nnew file mode 100644\nindex 0000000..1111111\n--- /dev/null\n+++ b/content/research/post.md\n@@ -0,0 +1,{} @@\n{}\n",
        added.len(),
        added.join("\n")
    )
}

const VALID_FRONTMATTER: [&str; 3] = [
    "date: 2025-01-01",
    "entities: [a,b]",
    "title: \"A sufficiently long title\"",
];

const COMPLETE_BODY: &str = "## Summary\n## Methodology\n## Conclusion\n```code```\n## References\n{{< figure >}}";

struct FakeGitHub {
    diff: String,
    reachable: bool,
    fail_posting: bool,
    diff_fetches: AtomicUsize,
    comments: Mutex<Vec<String>>,
}

impl FakeGitHub {
    fn with_diff(diff: String) -> Self {
        Self {
            diff,
            reachable: true,
            fail_posting: false,
            diff_fetches: AtomicUsize::new(0),
            comments: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PullRequestSource for FakeGitHub {
    async fn fetch_pull_request(&self, url: &str) -> Result<PullRequest, GitHubError> {
        if !self.reachable {
            return Err(GitHubError::Authentication);
        }
        PullRequest::parse_url(url)
    }

    async fn fetch_diff(&self, _pr: &PullRequest) -> Result<String, GitHubError> {
        self.diff_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.diff.clone())
    }

    async fn create_issue_comment(&self, _pr: &PullRequest, body: &str) -> Result<(), GitHubError> {
        if self.fail_posting {
            return Err(GitHubError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        self.comments.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

struct FakeLlm {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl FakeLlm {
    fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RetrievalClient for FakeLlm {
    async fn completion_with_retrieval(
        &self,
        _request: &RetrievalRequest,
    ) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or(AnalysisError::Search("search backend down".to_string()))
    }
}

fn checker<'a>(
    github: &'a FakeGitHub,
    llm: &'a FakeLlm,
    tmp: &TempDir,
    context: ExecutionContext,
) -> ArticleChecker<'a> {
    ArticleChecker::new(
        github,
        llm,
        Cache::new(tmp.path(), DEFAULT_MAX_AGE),
        CheckerConfig::default(),
        context,
    )
}

#[tokio::test]
async fn test_well_formed_article_passes() {
    let tmp = TempDir::new().unwrap();
    let github = FakeGitHub::with_diff(article_diff(&VALID_FRONTMATTER, COMPLETE_BODY));
    let llm = FakeLlm::answering("Solid methodology.");

    let outcome = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap();

    assert!(outcome.article.starts_with("---\ndate: 2025-01-01\n"));
    assert!(outcome.validation.headers.valid, "{}", outcome.validation.headers.message);
    assert!(outcome.validation.structure.valid);
    assert!(outcome.validation.structure.issues.is_empty());
    assert_eq!(outcome.analysis.source, AnalysisSource::Remote);
    assert!(outcome.report.starts_with("## Validation Results\n\nSolid methodology."));
    assert!(outcome.report.contains("✅ Headers validated successfully"));
    assert!(!outcome.report.contains("Structure Check"));
    assert_eq!(outcome.post, PostOutcome::Skipped);
}

#[tokio::test]
async fn test_missing_entities_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let frontmatter = ["date: 2025-01-01", "title: \"A sufficiently long title\""];
    let github = FakeGitHub::with_diff(article_diff(&frontmatter, COMPLETE_BODY));
    let llm = FakeLlm::answering("Review text.");

    let outcome = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap();

    assert!(!outcome.validation.headers.valid);
    assert_eq!(
        outcome.validation.headers.message,
        "Missing required YAML headers: entities"
    );
    assert!(outcome.report.contains("❌ Missing required YAML headers: entities"));
    // 校验失败不影响 LLM 分析
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_structure_issues_are_listed_in_report() {
    let tmp = TempDir::new().unwrap();
    let body = "## Summary\n## Methodology\n## Conclusion\n{{< figure >}}";
    let github = FakeGitHub::with_diff(article_diff(&VALID_FRONTMATTER, body));
    let llm = FakeLlm::answering("ok");

    let outcome = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap();

    assert_eq!(outcome.validation.structure.issues.len(), 2);
    assert!(outcome.report.contains("### Structure Check\n❌ No code blocks found"));
}

#[tokio::test]
async fn test_llm_failure_falls_back_and_replays_from_cache() {
    let tmp = TempDir::new().unwrap();
    let github = FakeGitHub::with_diff(article_diff(&VALID_FRONTMATTER, COMPLETE_BODY));
    let llm = FakeLlm::failing();

    let first = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap();
    assert_eq!(first.analysis.source, AnalysisSource::Fallback);
    assert!(first.report.contains("LLM API Error"));

    let second = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap();
    assert_eq!(second.analysis.source, AnalysisSource::Cache);
    assert_eq!(second.analysis.content, FALLBACK_RESPONSE);

    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    assert_eq!(github.diff_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_diff_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let github = FakeGitHub::with_diff(String::new());
    let llm = FakeLlm::answering("unused");

    let err = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckerError::EmptyDiff(_)));
    assert_eq!(err.exit_code(), EXIT_EMPTY_DIFF);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_github_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let mut github = FakeGitHub::with_diff(String::new());
    github.reachable = false;
    let llm = FakeLlm::answering("unused");

    let err = checker(&github, &llm, &tmp, ExecutionContext::local())
        .run(PULL_URL)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), EXIT_SOURCE_CONTROL);
}

#[tokio::test]
async fn test_comment_posted_in_ci() {
    let tmp = TempDir::new().unwrap();
    let github = FakeGitHub::with_diff(article_diff(&VALID_FRONTMATTER, COMPLETE_BODY));
    let llm = FakeLlm::answering("Posted review.");
    let ci = ExecutionContext {
        post_comments: true,
    };

    let outcome = checker(&github, &llm, &tmp, ci).run(PULL_URL).await.unwrap();
    assert_eq!(outcome.post, PostOutcome::Posted);
    assert_eq!(*github.comments.lock().unwrap(), vec![outcome.report.clone()]);
}

#[tokio::test]
async fn test_posting_failure_does_not_fail_run() {
    let tmp = TempDir::new().unwrap();
    let mut github = FakeGitHub::with_diff(article_diff(&VALID_FRONTMATTER, COMPLETE_BODY));
    github.fail_posting = true;
    let llm = FakeLlm::answering("review");
    let ci = ExecutionContext {
        post_comments: true,
    };

    let outcome = checker(&github, &llm, &tmp, ci).run(PULL_URL).await.unwrap();
    assert_eq!(outcome.post, PostOutcome::Failed);
}

#[tokio::test]
async fn test_unusable_cache_dir_does_not_stop_run() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let github = FakeGitHub::with_diff(article_diff(&VALID_FRONTMATTER, COMPLETE_BODY));
    let llm = FakeLlm::answering("still works");
    let outcome = ArticleChecker::new(
        &github,
        &llm,
        Cache::new(&blocker, DEFAULT_MAX_AGE),
        CheckerConfig::default(),
        ExecutionContext::local(),
    )
    .run(PULL_URL)
    .await
    .unwrap();

    assert_eq!(outcome.analysis.content, "still works");
}
