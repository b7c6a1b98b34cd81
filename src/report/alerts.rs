//! Crisis alerts ranked by event severity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::news::models::Article;

pub const MAX_ALERTS: usize = 10;
const SUMMARY_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    /// Goldstein scale runs -10 (most destabilizing) to +10. Missing counts as 0.
    pub fn from_goldstein(scale: Option<f64>) -> Self {
        let scale = scale.unwrap_or(0.0);
        if scale <= -5.0 {
            Self::Critical
        } else if scale <= -2.0 {
            Self::High
        } else {
            Self::Medium
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source_name: String,
    pub url: String,
    pub published_at_utc: Option<DateTime<Utc>>,
    pub category: String,
    pub country_tags: Vec<String>,
    pub goldstein_scale: Option<f64>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFeed {
    pub alerts: Vec<Alert>,
    pub total_crisis: usize,
}

fn is_crisis(article: &Article) -> bool {
    article.is_crisis || article.category == "Crisis"
}

/// Most severe crisis articles first, older before newer on equal scale.
pub fn build_alerts(articles: &[Article]) -> AlertFeed {
    let mut crisis: Vec<&Article> = articles.iter().filter(|a| is_crisis(a)).collect();
    crisis.sort_by(|a, b| {
        a.goldstein_scale
            .unwrap_or(0.0)
            .total_cmp(&b.goldstein_scale.unwrap_or(0.0))
            .then_with(|| a.published_at_utc.cmp(&b.published_at_utc))
    });

    let alerts = crisis
        .iter()
        .take(MAX_ALERTS)
        .map(|a| Alert {
            id: a.id.clone(),
            title: a.title.clone(),
            summary: truncate_summary(&a.content_summary),
            source_name: a.source_name.clone(),
            url: a.url.clone(),
            published_at_utc: a.published_at_utc,
            category: a.category.clone(),
            country_tags: a.country_tags.clone(),
            goldstein_scale: a.goldstein_scale,
            severity: Severity::from_goldstein(a.goldstein_scale),
        })
        .collect();

    AlertFeed {
        alerts,
        total_crisis: crisis.len(),
    }
}

fn truncate_summary(text: &str) -> String {
    if text.chars().count() > SUMMARY_CHARS {
        let head: String = text.chars().take(SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crisis(id: &str, goldstein: Option<f64>, published: Option<&str>) -> Article {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": id,
            "is_crisis": true,
            "goldstein_scale": goldstein,
            "published_at_utc": published,
        }))
        .unwrap()
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_goldstein(Some(-7.0)), Severity::Critical);
        assert_eq!(Severity::from_goldstein(Some(-5.0)), Severity::Critical);
        assert_eq!(Severity::from_goldstein(Some(-2.0)), Severity::High);
        assert_eq!(Severity::from_goldstein(Some(-1.9)), Severity::Medium);
        assert_eq!(Severity::from_goldstein(None), Severity::Medium);
    }

    #[test]
    fn test_sorted_by_goldstein_then_time() {
        let articles = vec![
            crisis("mild", Some(-1.0), None),
            crisis("none", None, None),
            crisis("late", Some(-8.0), Some("2025-01-02T00:00:00Z")),
            crisis("early", Some(-8.0), Some("2025-01-01T00:00:00Z")),
        ];
        let feed = build_alerts(&articles);
        let ids: Vec<&str> = feed.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "mild", "none"]);
    }

    #[test]
    fn test_crisis_category_counts_and_others_excluded() {
        let mut by_category: Article =
            serde_json::from_value(serde_json::json!({"id": "cat", "category": "Crisis"})).unwrap();
        by_category.is_crisis = false;
        let calm: Article = serde_json::from_value(serde_json::json!({"id": "calm"})).unwrap();
        let feed = build_alerts(&[by_category, calm]);
        assert_eq!(feed.total_crisis, 1);
        assert_eq!(feed.alerts[0].id, "cat");
    }

    #[test]
    fn test_top_ten_only() {
        let articles: Vec<Article> = (0..15).map(|i| crisis(&i.to_string(), None, None)).collect();
        let feed = build_alerts(&articles);
        assert_eq!(feed.alerts.len(), MAX_ALERTS);
        assert_eq!(feed.total_crisis, 15);
    }

    #[test]
    fn test_summary_truncated_by_chars() {
        let long = "항".repeat(250);
        assert_eq!(truncate_summary(&long).chars().count(), SUMMARY_CHARS + 3);
        assert!(truncate_summary(&long).ends_with("..."));
        assert_eq!(truncate_summary("short"), "short");
    }
}
