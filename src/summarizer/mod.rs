//! Insight summarizer capability.
//!
//! The headline pipeline only knows this trait; the concrete model client
//! lives in [`claude`] and tests plug in fakes.

pub mod claude;

use async_trait::async_trait;
use thiserror::Error;

use crate::news::models::Insights;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("summarizer call timed out")]
    Timeout,

    #[error("summarizer request failed: {0}")]
    Transport(String),

    #[error("summarizer quota exceeded: {0}")]
    Quota(String),

    #[error("summarizer API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed summarizer response: {0}")]
    Malformed(String),
}

/// Produces trade / logistics / SCM takeaways for one article.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        title: &str,
        content_summary: &str,
    ) -> Result<Insights, SummarizerError>;

    /// Human-readable name of this summarizer.
    fn name(&self) -> &str;
}
