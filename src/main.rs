use clap::Parser;
use rss_checker::{CheckerConfig, RssChecker, DEFAULT_OUTPUT_FORMAT};
use std::path::PathBuf;
use tracing::info;

/// A cli RSS feed checker.
#[derive(Debug, Parser)]
#[command(name = "rss_checker", version, about = "A cli RSS feed checker")]
struct Cli {
    /// the directory path to source conf files
    #[arg(
        long = "conf-path",
        env = "RSS_CHECKER_CONF_PATH",
        default_value = "conf"
    )]
    conf_path: PathBuf,

    /// the directory path to store all cache files
    #[arg(
        long = "cache-path",
        env = "RSS_CHECKER_CACHE_PATH",
        default_value = ".rss_checker/cache"
    )]
    cache_path: PathBuf,

    /// a formatting string for the resulting output data
    #[arg(
        long = "format",
        env = "RSS_CHECKER_OUTPUT_FORMAT",
        default_value = DEFAULT_OUTPUT_FORMAT
    )]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Rendered items go to stdout; keep diagnostics on stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CheckerConfig {
        conf_path: cli.conf_path,
        cache_path: cli.cache_path,
        output_format: cli.format,
    };

    let checker = RssChecker::new(config)?;
    let mut stdout = std::io::stdout();
    let report = checker.run(&mut stdout).await?;

    if !report.is_success() {
        let failed: Vec<&str> = report.failures().map(|(feed, _)| feed).collect();
        anyhow::bail!(
            "{} of {} feed(s) failed: {}",
            failed.len() + report.panicked,
            report.reports.len() + report.panicked,
            failed.join(", ")
        );
    }

    info!("checked {} feed(s)", report.reports.len());
    Ok(())
}
