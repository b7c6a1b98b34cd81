//! JSON artifacts for the static dashboard.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::info;

use crate::news::models::{Article, Headline, Keyword};
use crate::pipeline::BriefingOutput;
use crate::report::alerts::{build_alerts, AlertFeed};
use crate::report::map::{build_risk_map, RiskMap};

const KST_OFFSET_SECS: i32 = 9 * 3600;
const MAX_WORD_SIZE: usize = 100;

#[derive(Serialize)]
struct NewsFile<'a> {
    articles: &'a [Article],
    total: usize,
    kr_count: usize,
    global_count: usize,
    crisis_count: usize,
    categories: &'a BTreeMap<String, usize>,
    generated_at: String,
}

#[derive(Serialize)]
struct HeadlinesFile<'a> {
    headlines: &'a [Headline],
    total: usize,
    generated_at: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct WordcloudEntry<'a> {
    text: &'a str,
    count: usize,
    size: usize,
}

#[derive(Serialize)]
struct WordcloudFile<'a> {
    keywords: Vec<WordcloudEntry<'a>>,
    total_keywords: usize,
    generated_at: String,
}

#[derive(Serialize)]
struct MapFile {
    #[serde(flatten)]
    map: RiskMap,
    generated_at: String,
}

#[derive(Serialize)]
struct AlertsFile {
    #[serde(flatten)]
    feed: AlertFeed,
    generated_at: String,
}

#[derive(Serialize)]
struct LastUpdateFile<'a> {
    executed_at_utc: String,
    executed_at_kst: String,
    total_collected: usize,
    kr_count: usize,
    global_count: usize,
    crisis_count: usize,
    categories: &'a BTreeMap<String, usize>,
    groups_formed: usize,
    headlines_selected: usize,
    insight_failures: usize,
    duration_seconds: f64,
    success: bool,
}

fn utc_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn kst_stamp(now: DateTime<Utc>) -> String {
    FixedOffset::east_opt(KST_OFFSET_SECS)
        .map(|kst| now.with_timezone(&kst).format("%Y-%m-%dT%H:%M:%S%:z").to_string())
        .unwrap_or_else(|| utc_stamp(now))
}

fn wordcloud_entries(keywords: &[Keyword]) -> Vec<WordcloudEntry<'_>> {
    keywords
        .iter()
        .map(|k| WordcloudEntry {
            text: &k.text,
            count: k.count,
            size: (k.count * 10).min(MAX_WORD_SIZE),
        })
        .collect()
}

/// Write every dashboard artifact into `dir`, creating it if needed.
///
/// Returns the written paths in write order.
pub fn write_artifacts(
    dir: &Path,
    output: &BriefingOutput,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;

    let stats = &output.stats;
    let generated_at = utc_stamp(now);
    let mut written = Vec::new();

    written.push(write_json(
        dir,
        "news_data.json",
        &NewsFile {
            articles: &output.articles,
            total: output.articles.len(),
            kr_count: stats.kr_articles,
            global_count: stats.global_articles,
            crisis_count: stats.crisis_articles,
            categories: &stats.categories,
            generated_at: generated_at.clone(),
        },
    )?);

    written.push(write_json(
        dir,
        "headlines_data.json",
        &HeadlinesFile {
            headlines: &output.headlines,
            total: output.headlines.len(),
            generated_at: generated_at.clone(),
        },
    )?);

    written.push(write_json(
        dir,
        "wordcloud_data.json",
        &WordcloudFile {
            keywords: wordcloud_entries(&output.keywords),
            total_keywords: output.keywords.len(),
            generated_at: generated_at.clone(),
        },
    )?);

    let map = build_risk_map(&output.articles);
    info!(countries = map.total_crisis_countries, "Built risk map");
    written.push(write_json(
        dir,
        "map_data.json",
        &MapFile {
            map,
            generated_at: generated_at.clone(),
        },
    )?);

    let feed = build_alerts(&output.articles);
    info!(alerts = feed.alerts.len(), total_crisis = feed.total_crisis, "Built alerts");
    written.push(write_json(
        dir,
        "alerts_data.json",
        &AlertsFile {
            feed,
            generated_at,
        },
    )?);

    written.push(write_json(
        dir,
        "last_update.json",
        &LastUpdateFile {
            executed_at_utc: utc_stamp(now),
            executed_at_kst: kst_stamp(now),
            total_collected: stats.total_articles,
            kr_count: stats.kr_articles,
            global_count: stats.global_articles,
            crisis_count: stats.crisis_articles,
            categories: &stats.categories,
            groups_formed: stats.groups_formed,
            headlines_selected: stats.headlines_selected,
            insight_failures: stats.insight_failures,
            duration_seconds: stats.duration_ms as f64 / 1000.0,
            success: true,
        },
    )?);

    info!(dir = %dir.display(), files = written.len(), "Artifacts written");
    Ok(written)
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {name}"))?;
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
