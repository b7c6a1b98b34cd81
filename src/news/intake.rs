//! Article intake: URL normalization, deduplication, recency window and ids.
//!
//! Runs before grouping so the core only ever sees URL-unique articles.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::ConfigError;
use crate::news::models::Article;

/// Hosts whose article URLs carry tracking query strings that do not identify the article.
const QUERY_STRIPPED_HOSTS: &[&str] = &["n.news.naver.com", "news.naver.com", "m.news.naver.com"];

/// Length of the hex id derived from an article URL.
const ID_LEN: usize = 12;

/// Normalize a URL for duplicate detection.
///
/// Only surrounding whitespace is trimmed, so fragments still distinguish articles.
/// Portal URLs additionally lose their query string.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if strips_query(url) {
        url.split('?').next().unwrap_or(url).to_string()
    } else {
        url.to_string()
    }
}

fn strips_query(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split(['/', '?']).next().unwrap_or("");
    QUERY_STRIPPED_HOSTS.contains(&host)
}

/// Drop articles whose normalized URL was already seen. First occurrence wins.
///
/// Articles without a URL cannot be compared and are kept.
pub fn dedupe_by_url(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let mut seen = HashSet::new();

    let unique: Vec<Article> = articles
        .into_iter()
        .filter(|article| {
            let key = normalize_url(&article.url);
            key.is_empty() || seen.insert(key)
        })
        .collect();

    info!(before, after = unique.len(), "Deduplicated articles by URL");
    unique
}

/// The recency window for `hours`. Must be positive and representable as a duration.
pub fn recency_window(hours: i64) -> Result<Duration, ConfigError> {
    if hours <= 0 {
        return Err(ConfigError::InvalidRecency(hours));
    }
    Duration::try_hours(hours).ok_or(ConfigError::InvalidRecency(hours))
}

/// Keep articles published within `hours` of `now`. Undated articles are kept.
///
/// A window reaching past the earliest representable time keeps every article.
pub fn filter_recent(
    articles: Vec<Article>,
    hours: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Article>, ConfigError> {
    let cutoff = now.checked_sub_signed(recency_window(hours)?);
    let recent: Vec<Article> = articles
        .into_iter()
        .filter(|a| match (a.published_at_utc, cutoff) {
            (Some(published), Some(cutoff)) => published >= cutoff,
            _ => true,
        })
        .collect();

    info!(count = recent.len(), hours, "Filtered to recent articles");
    Ok(recent)
}

/// Stable article id: the first 12 hex chars of the SHA-256 of its URL.
pub fn article_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex.truncate(ID_LEN);
    hex
}

/// Fill in ids for articles that arrived without one.
pub fn assign_missing_ids(articles: &mut [Article]) {
    for article in articles.iter_mut().filter(|a| a.id.trim().is_empty()) {
        article.id = article_id(&article.url);
    }
}

/// Order articles newest first; undated articles go last. Stable for equal times.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at_utc.cmp(&a.published_at_utc));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(url: &str, published: Option<DateTime<Utc>>) -> Article {
        serde_json::from_value(serde_json::json!({
            "title": "t",
            "url": url,
            "published_at_utc": published,
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_url_trims_and_keeps_fragment() {
        assert_eq!(
            normalize_url(" https://a.example/story#comments "),
            "https://a.example/story#comments"
        );
    }

    #[test]
    fn test_dedupe_treats_fragments_as_distinct() {
        let articles = vec![
            article("https://a.example/live#update-1", None),
            article("https://a.example/live#update-2", None),
            article("https://a.example/live#update-1", None),
        ];
        let unique = dedupe_by_url(articles);
        let urls: Vec<&str> = unique.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/live#update-1", "https://a.example/live#update-2"]);
    }

    #[test]
    fn test_normalize_url_keeps_query_for_regular_hosts() {
        assert_eq!(
            normalize_url("https://a.example/story?id=7"),
            "https://a.example/story?id=7"
        );
    }

    #[test]
    fn test_normalize_url_strips_naver_query() {
        assert_eq!(
            normalize_url("https://n.news.naver.com/article/001/0001?sid=101"),
            "https://n.news.naver.com/article/001/0001"
        );
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let articles = vec![
            article("https://n.news.naver.com/a/1?sid=1", None),
            article("https://b.example/2", None),
            article("https://n.news.naver.com/a/1?sid=2", None),
        ];
        let unique = dedupe_by_url(articles);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].url, "https://n.news.naver.com/a/1?sid=1");
    }

    #[test]
    fn test_dedupe_keeps_urlless_articles() {
        let unique = dedupe_by_url(vec![article("", None), article("", None)]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_filter_recent() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let articles = vec![
            article("https://a/1", Some(now - Duration::hours(10))),
            article("https://a/2", Some(now - Duration::hours(100))),
            article("https://a/3", None),
        ];
        let recent = filter_recent(articles, 72, now).unwrap();
        let urls: Vec<&str> = recent.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/3"]);
    }

    #[test]
    fn test_filter_recent_rejects_bad_windows() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        for hours in [0, -24, 9_000_000_000_000, i64::MAX] {
            let articles = vec![article("https://a/1", Some(now))];
            assert_eq!(
                filter_recent(articles, hours, now).unwrap_err(),
                ConfigError::InvalidRecency(hours)
            );
        }
    }

    #[test]
    fn test_window_past_earliest_time_keeps_everything() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let ancient = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        let articles = vec![article("https://a/1", Some(ancient))];
        // Representable as a duration, but not subtractable from `now`.
        let recent = filter_recent(articles, 2_000_000_000_000, now).unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_article_id_is_stable_hex() {
        let id = article_id("https://a.example/1");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, article_id("https://a.example/1"));
        assert_ne!(id, article_id("https://a.example/2"));
    }

    #[test]
    fn test_assign_missing_ids_keeps_existing() {
        let mut articles = vec![article("https://a/1", None), article("https://a/2", None)];
        articles[0].id = "given".to_string();
        assign_missing_ids(&mut articles);
        assert_eq!(articles[0].id, "given");
        assert_eq!(articles[1].id, article_id("https://a/2"));
    }

    #[test]
    fn test_sort_newest_first_puts_undated_last() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let mut articles = vec![
            article("https://a/old", Some(now - Duration::hours(5))),
            article("https://a/none", None),
            article("https://a/new", Some(now)),
        ];
        sort_newest_first(&mut articles);
        let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/new", "https://a/old", "https://a/none"]);
    }
}
