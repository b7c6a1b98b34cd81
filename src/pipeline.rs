//! One headline briefing run, from raw articles to presentation-ready output.
//!
//! intake → group → select → attach insights → extract keywords → stats.
//! Every stage except insight attachment is synchronous and CPU-only.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::grouping::cluster::group_articles;
use crate::headlines::insights::InsightAttacher;
use crate::headlines::selector::select_headlines;
use crate::keywords::extract_keywords;
use crate::monitoring::metrics::RunStats;
use crate::news::intake;
use crate::news::models::{Article, Headline, Keyword};
use crate::summarizer::Summarizer;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct BriefingOutput {
    /// Intake survivors, newest first.
    pub articles: Vec<Article>,
    pub headlines: Vec<Headline>,
    pub keywords: Vec<Keyword>,
    pub stats: RunStats,
}

pub struct Pipeline {
    config: AppConfig,
    attacher: Option<InsightAttacher>,
}

impl Pipeline {
    /// Build a pipeline. Without a summarizer, headlines keep empty insights.
    pub fn new(
        config: AppConfig,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let attacher = match summarizer {
            Some(s) if config.insights.enabled => Some(InsightAttacher::new(
                s,
                config.insights.max_concurrency,
                config.insights.timeout(),
            )?),
            _ => None,
        };

        Ok(Self { config, attacher })
    }

    pub fn has_insights(&self) -> bool {
        self.attacher.is_some()
    }

    #[instrument(skip_all, fields(input = articles.len()))]
    pub async fn run(
        &self,
        articles: Vec<Article>,
        now: DateTime<Utc>,
    ) -> Result<BriefingOutput, ConfigError> {
        let started = Instant::now();

        let articles = intake::dedupe_by_url(articles);
        let mut articles =
            intake::filter_recent(articles, self.config.intake.recency_hours, now)?;
        intake::assign_missing_ids(&mut articles);

        let mut stats = RunStats::from_articles(&articles);

        let (headlines, groups_formed) = {
            let groups = group_articles(&articles, self.config.grouping.threshold)?;
            let headlines =
                select_headlines(&groups, self.config.selection.per_population_limit);
            (headlines, groups.len())
        };
        stats.groups_formed = groups_formed;
        stats.headlines_selected = headlines.len();

        let headlines = match &self.attacher {
            Some(attacher) => {
                let attached = attacher.attach_all(headlines).await;
                stats.record_insights(&attached);
                attached
            }
            None => {
                info!("Insight attachment disabled, headlines keep empty insights");
                headlines
            }
        };

        let keywords = extract_keywords(&articles, &self.config.keywords);
        stats.keywords_extracted = keywords.len();

        intake::sort_newest_first(&mut articles);
        stats.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(BriefingOutput {
            articles,
            headlines,
            keywords,
            stats,
        })
    }
}
