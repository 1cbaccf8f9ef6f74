//! 流水线编排：diff → 校验 → LLM 分析 → 报告
//!
//! Only failures that leave no article text (GitHub access, empty diff) are
//! returned as errors; everything else is recorded in [`CheckOutcome`].

use crate::analysis::{AnalysisResult, ArticleAnalyzer};
use crate::args::Args;
use crate::cache::Cache;
use crate::clients::{BraveSearch, ClaudeRetriever, GitHubClient, PullRequestSource, RetrievalClient};
use crate::config::CheckerConfig;
use crate::diff::{acquire_diff, extract_article_text, FileDiff};
use crate::errors::CheckerError;
use crate::report::{compose_report, console_summary, publish_report, ExecutionContext, PostOutcome};
use crate::validation::ValidationReport;

const RULE_WIDTH: usize = 80;

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub article: String,
    pub validation: ValidationReport,
    pub analysis: AnalysisResult,
    pub report: String,
    pub post: PostOutcome,
}

pub struct ArticleChecker<'a> {
    source: &'a dyn PullRequestSource,
    client: &'a dyn RetrievalClient,
    cache: Cache,
    config: CheckerConfig,
    context: ExecutionContext,
}

impl<'a> ArticleChecker<'a> {
    pub fn new(
        source: &'a dyn PullRequestSource,
        client: &'a dyn RetrievalClient,
        cache: Cache,
        config: CheckerConfig,
        context: ExecutionContext,
    ) -> Self {
        Self {
            source,
            client,
            cache,
            config,
            context,
        }
    }

    pub async fn run(&self, pull_url: &str) -> Result<CheckOutcome, CheckerError> {
        if let Err(e) = self.cache.ensure_dirs() {
            tracing::warn!("Cache directory unavailable, continuing without it: {}", e);
        }

        let pr = self.source.fetch_pull_request(pull_url).await?;
        let files = acquire_diff(self.source, &self.cache, &pr).await?;

        print_section("PR DIFF EXCERPT:");
        println!("{}", render_excerpt(&files));

        let article = extract_article_text(&files, &pr.url)?;

        print_section("VALIDATION CHECKS");
        let validation = ValidationReport::run(&article);
        print!("{}", console_summary(&validation));

        let analysis = ArticleAnalyzer::new(self.client, &self.cache, &self.config)
            .analyze(&article)
            .await;
        print_section("LLM ANALYSIS RESPONSE:");
        println!("{}", analysis.content);

        print_section("Creating PR comment...");
        let report = compose_report(&analysis.content, &validation);
        let post = publish_report(self.source, &pr, &report, self.context).await;

        println!("\n✓ Article check completed");
        Ok(CheckOutcome {
            article,
            validation,
            analysis,
            report,
            post,
        })
    }
}

/// Wire the production clients from CLI arguments and run once.
pub async fn run_with_args(args: &Args) -> Result<CheckOutcome, CheckerError> {
    let config = CheckerConfig::load(&args.config);
    let cache = Cache::new(&args.cache_dir, config.cache_max_age());

    let github = GitHubClient::with_api_url(args.github_token.clone(), args.github_api_url.clone());
    let search = BraveSearch::new(args.search_api_key.clone());
    let retriever = ClaudeRetriever::new(args.llm_api_key.clone(), Box::new(search));

    ArticleChecker::new(&github, &retriever, cache, config, ExecutionContext::from_env())
        .run(&args.pull_url)
        .await
}

fn print_section(title: &str) {
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("{title}");
    println!("{}", "-".repeat(RULE_WIDTH));
}

/// 每个文件打印路径和各 hunk
fn render_excerpt(files: &[FileDiff]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!("{}\n", file.path));
        out.push_str(&file.header);
        for hunk in &file.hunks {
            out.push_str(&format!("{}\n{}", hunk.header, hunk.body));
        }
    }
    out
}
