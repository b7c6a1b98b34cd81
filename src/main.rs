use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use headline_digest::config::{AppConfig, Secrets};
use headline_digest::monitoring::{logger, metrics};
use headline_digest::news::models::Article;
use headline_digest::pipeline::Pipeline;
use headline_digest::report;
use headline_digest::summarizer::claude::ClaudeSummarizer;
use headline_digest::summarizer::Summarizer;

/// Balanced headline briefing from a batch of collected news articles
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON array of collected articles
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the TOML config (default: config/default.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for dashboard artifacts (overrides [output].dir)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip the summarizer even when an API key is available
    #[arg(long)]
    no_insights: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, secrets) = AppConfig::load(args.config.as_deref())?;

    logger::init_logging(&config.monitoring)?;

    tracing::info!(
        input = %args.input.display(),
        threshold = config.grouping.threshold,
        per_population_limit = config.selection.per_population_limit,
        "Headline digest starting"
    );

    let articles = read_articles(&args.input)?;
    let summarizer = build_summarizer(&config, secrets, args.no_insights)?;

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.output.dir));

    let pipeline = Pipeline::new(config, summarizer)?;
    let now = Utc::now();
    let output = pipeline.run(articles, now).await?;

    metrics::log_stats(&output.stats);
    report::write_artifacts(&output_dir, &output, now)?;

    println!("\n{}", output.stats.summary());
    Ok(())
}

fn read_articles(path: &Path) -> Result<Vec<Article>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read articles: {}", path.display()))?;
    let articles: Vec<Article> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse articles: {}", path.display()))?;
    tracing::info!(count = articles.len(), "Loaded articles");
    Ok(articles)
}

/// The Claude summarizer, when insights are enabled and a key is configured.
fn build_summarizer(
    config: &AppConfig,
    secrets: Secrets,
    no_insights: bool,
) -> Result<Option<Arc<dyn Summarizer>>> {
    if no_insights || !config.insights.enabled {
        tracing::info!("Insights disabled");
        return Ok(None);
    }

    let Some(api_key) = secrets.anthropic_api_key else {
        tracing::warn!("ANTHROPIC_API_KEY not set, skipping insights");
        return Ok(None);
    };

    let summarizer = ClaudeSummarizer::new(api_key, &config.insights)
        .context("Failed to build Claude summarizer")?;
    Ok(Some(Arc::new(summarizer)))
}
