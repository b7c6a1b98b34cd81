use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::grouping::cluster::{validate_threshold, DEFAULT_THRESHOLD};
use crate::headlines::insights::DEFAULT_MAX_CONCURRENCY;
use crate::headlines::selector::DEFAULT_PER_POPULATION_LIMIT;
use crate::news::intake::recency_window;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub intake: IntakeConfig,
    pub grouping: GroupingConfig,
    pub selection: SelectionConfig,
    pub insights: InsightConfig,
    pub keywords: KeywordConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Articles older than this are dropped before grouping.
    pub recency_hours: i64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self { recency_hours: 72 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub threshold: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub per_population_limit: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            per_population_limit: DEFAULT_PER_POPULATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub enabled: bool,
    pub max_concurrency: usize,
    pub timeout_seconds: u64,
    pub model: String,
    pub api_base_url: String,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl InsightConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout_seconds: 30,
            model: "claude-sonnet-4-20250514".to_string(),
            api_base_url: "https://api.anthropic.com".to_string(),
            requests_per_second: 2,
            burst_size: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub top_n: usize,
    /// Generic industry terms never shown in the wordcloud. Whole-phrase, case-insensitive.
    pub stoplist: Vec<String>,
    /// Words and phrases trimmed from either end of a candidate phrase.
    pub fillers: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            top_n: 100,
            stoplist: to_strings(DEFAULT_STOPLIST),
            fillers: to_strings(DEFAULT_FILLERS),
        }
    }
}

const DEFAULT_STOPLIST: &[&str] = &[
    "logistics", "supply chain", "supply chains", "shipping", "freight", "cargo",
    "transport", "transportation", "industry", "market", "markets", "company",
    "companies", "news", "report", "says", "said", "new", "year", "week",
    "물류", "공급망", "해운", "운송", "산업", "시장", "기업", "뉴스", "기자", "관련",
];

const DEFAULT_FILLERS: &[&str] = &[
    "port of", "a", "an", "the", "in", "of", "on", "at", "to", "for", "from", "by",
    "with", "and", "or", "as", "is", "are", "was", "were", "be", "been", "has", "have",
    "had", "its", "it", "this", "that", "these", "those", "after", "over", "into",
    "amid", "than", "but", "not", "will", "would", "could", "can", "may", "about",
    "more", "up", "out", "their", "his", "her", "they", "he", "she", "we", "our",
    "및", "등", "위해", "대한", "통해", "이번", "지난",
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "frontend/data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Secrets loaded exclusively from environment variables.
/// Not serializable, not stored in config files.
pub struct Secrets {
    pub anthropic_api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, overlaying environment variables for secrets.
    pub fn load(path: Option<&Path>) -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok((config, Secrets::from_env()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject structurally invalid settings before any article is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.grouping.threshold)?;
        recency_window(self.intake.recency_hours)?;
        if self.insights.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.insights.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}
