//! Attaches summarizer insights to selected headlines.
//!
//! Calls run concurrently under a fixed-size semaphore, each with its own
//! timeout. A failed call leaves that headline's insights empty and never
//! affects the others.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::error::ConfigError;
use crate::news::models::{Headline, Insights};
use crate::summarizer::{Summarizer, SummarizerError};

pub const DEFAULT_MAX_CONCURRENCY: usize = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct InsightAttacher {
    summarizer: Arc<dyn Summarizer>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl InsightAttacher {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        max_concurrency: usize,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Self {
            summarizer,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            timeout,
        })
    }

    /// Populate one headline's insights, leaving them empty on failure.
    pub async fn attach_insights(&self, mut headline: Headline) -> Headline {
        headline.insights = summarize_bounded(
            self.summarizer.clone(),
            self.permits.clone(),
            self.timeout,
            headline.title.clone(),
            headline.content_summary.clone(),
        )
        .await;
        headline
    }

    /// Populate insights for every headline concurrently. Output order matches input order.
    #[instrument(skip_all, fields(headlines = headlines.len(), summarizer = self.summarizer.name()))]
    pub async fn attach_all(&self, headlines: Vec<Headline>) -> Vec<Headline> {
        let handles: Vec<_> = headlines
            .iter()
            .map(|h| {
                tokio::spawn(summarize_bounded(
                    self.summarizer.clone(),
                    self.permits.clone(),
                    self.timeout,
                    h.title.clone(),
                    h.content_summary.clone(),
                ))
            })
            .collect();

        let mut out = Vec::with_capacity(headlines.len());
        for (mut headline, handle) in headlines.into_iter().zip(handles) {
            headline.insights = match handle.await {
                Ok(insights) => insights,
                Err(e) => {
                    warn!(id = %headline.id, error = %e, "Insight task aborted");
                    Insights::default()
                }
            };
            out.push(headline);
        }

        let failed = out.iter().filter(|h| h.insights.is_empty()).count();
        info!(attached = out.len() - failed, failed, "Insight attachment complete");
        out
    }
}

async fn summarize_bounded(
    summarizer: Arc<dyn Summarizer>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    title: String,
    content_summary: String,
) -> Insights {
    let Ok(_permit) = permits.acquire_owned().await else {
        warn!(title = %title, "Insight semaphore closed");
        return Insights::default();
    };

    let result = match tokio::time::timeout(timeout, summarizer.summarize(&title, &content_summary)).await {
        Ok(result) => result,
        Err(_) => Err(SummarizerError::Timeout),
    };

    match result {
        Ok(insights) => insights,
        Err(e) => {
            warn!(title = %title, error = %e, "Insight generation failed");
            Insights::default()
        }
    }
}
