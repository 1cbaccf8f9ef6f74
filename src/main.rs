use anyhow::anyhow;
use clap::Parser;

use article_checker::app::run_with_args;
use article_checker::args::Args;
use article_checker::logging::{init_logging, LoggingConfig};

// 单线程运行时，所有步骤依次执行
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.verbose {
        LoggingConfig::development()
    } else if std::env::var("CI").is_ok() {
        LoggingConfig::production()
    } else {
        LoggingConfig::default()
    };
    init_logging(logging).map_err(|e| anyhow!("failed to initialise logging: {e}"))?;

    if let Err(e) = run_with_args(&args).await {
        tracing::error!("{}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}
