// 评审报告
// 汇总 LLM 分析与两项校验结果，在 CI 环境中发布为 PR 评论

use crate::clients::{PullRequest, PullRequestSource};
use crate::validation::{HeaderCheck, StructureCheck, ValidationReport};

const PASS: &str = "✅";
const FAIL: &str = "❌";

/// Where the checker is running; decides whether the report is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    pub post_comments: bool,
}

impl ExecutionContext {
    /// 只有在 GitHub Actions 中才发布评论
    pub fn from_env() -> Self {
        Self {
            post_comments: std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true"),
        }
    }

    pub fn local() -> Self {
        Self {
            post_comments: false,
        }
    }
}

/// Render the pull-request comment.
pub fn compose_report(analysis: &str, validation: &ValidationReport) -> String {
    let mut comment = format!("## Validation Results\n\n{analysis}");

    let HeaderCheck { valid, message } = &validation.headers;
    comment.push_str("\n\n### Headers Check\n");
    comment.push_str(&format!("{} {}", if *valid { PASS } else { FAIL }, message));

    let StructureCheck { issues, .. } = &validation.structure;
    if !issues.is_empty() {
        comment.push_str("\n\n### Structure Check\n");
        for issue in issues {
            comment.push_str(&format!("{FAIL} {issue}\n"));
        }
    }

    comment
}

/// 控制台摘要，与 PR 评论分开输出
pub fn console_summary(validation: &ValidationReport) -> String {
    let headers = &validation.headers;
    let mut out = format!(
        "Headers: {} - {}\n",
        if headers.valid { "✅ PASS" } else { "❌ FAIL" },
        headers.message
    );

    if validation.structure.valid {
        out.push_str("Markdown structure: ✅ PASS\n");
    } else {
        out.push_str("Markdown structure: ❌ FAIL\n");
        for issue in &validation.structure.issues {
            out.push_str(&format!("  - {issue}\n"));
        }
    }
    out
}

/// 发布结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Posted,
    Skipped,
    Failed,
}

/// Print the report and, when the context allows, post it.
///
/// A posting failure is logged and does not fail the run.
pub async fn publish_report(
    source: &dyn PullRequestSource,
    pr: &PullRequest,
    report: &str,
    context: ExecutionContext,
) -> PostOutcome {
    println!("{report}");

    if !context.post_comments {
        tracing::info!("Not running on GitHub Actions, comment not posted");
        return PostOutcome::Skipped;
    }

    match source.create_issue_comment(pr, report).await {
        Ok(()) => {
            tracing::info!(number = pr.number, "Comment posted on PR");
            PostOutcome::Posted
        }
        Err(e) => {
            tracing::error!("Error creating a comment on PR: {}", e);
            PostOutcome::Failed
        }
    }
}
