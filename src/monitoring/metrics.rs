//! Per-run statistics.
//!
//! Counts what one pipeline run consumed and produced so it can be logged
//! and written next to the other artifacts.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::news::models::{Article, Headline, Population};

/// Aggregated statistics for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RunStats {
    pub total_articles: usize,
    pub kr_articles: usize,
    pub global_articles: usize,
    pub crisis_articles: usize,
    pub categories: BTreeMap<String, usize>,
    pub groups_formed: usize,
    pub headlines_selected: usize,
    pub insight_failures: usize,
    pub keywords_extracted: usize,
    pub duration_ms: u64,
}

impl RunStats {
    /// Count the article-level fields of a processed batch.
    pub fn from_articles(articles: &[Article]) -> Self {
        let mut stats = Self {
            total_articles: articles.len(),
            ..Self::default()
        };

        for article in articles {
            match article.population {
                Population::Domestic => stats.kr_articles += 1,
                Population::Global => stats.global_articles += 1,
            }
            if article.is_crisis {
                stats.crisis_articles += 1;
            }
            *stats.categories.entry(article.category.clone()).or_default() += 1;
        }

        stats
    }

    /// Count headlines that went out without any insight.
    ///
    /// Only meaningful when the insight step actually ran.
    pub fn record_insights(&mut self, headlines: &[Headline]) {
        self.insight_failures = headlines.iter().filter(|h| h.insights.is_empty()).count();
    }

    /// Format stats for logging.
    pub fn summary(&self) -> String {
        format!(
            "Articles: {} ({} KR, {} GLOBAL, {} crisis)\n\
             Groups: {} | Headlines: {} ({} without insights)\n\
             Keywords: {} | Duration: {}ms",
            self.total_articles,
            self.kr_articles,
            self.global_articles,
            self.crisis_articles,
            self.groups_formed,
            self.headlines_selected,
            self.insight_failures,
            self.keywords_extracted,
            self.duration_ms,
        )
    }
}

/// Log run stats as structured tracing fields.
pub fn log_stats(stats: &RunStats) {
    info!(
        total_articles = stats.total_articles,
        kr_articles = stats.kr_articles,
        global_articles = stats.global_articles,
        crisis_articles = stats.crisis_articles,
        categories = stats.categories.len(),
        groups_formed = stats.groups_formed,
        headlines_selected = stats.headlines_selected,
        insight_failures = stats.insight_failures,
        keywords_extracted = stats.keywords_extracted,
        duration_ms = stats.duration_ms,
        "Run statistics"
    );
}
