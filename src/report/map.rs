//! Country risk map built from crisis and negative-sentiment coverage.

use std::collections::HashMap;

use serde::Serialize;

use crate::news::models::{Article, Sentiment};

pub const MAX_COUNTRIES: usize = 30;
pub const MAX_SAMPLES_PER_COUNTRY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn from_count(count: usize) -> Self {
        match count {
            n if n >= 5 => Self::High,
            n if n >= 2 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRef {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRisk {
    pub code: String,
    pub count: usize,
    pub risk_level: RiskLevel,
    pub articles: Vec<ArticleRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMap {
    pub countries: Vec<CountryRisk>,
    pub total_crisis_countries: usize,
}

/// Count crisis or negative articles per tagged country.
///
/// Countries are ordered by count descending, ties in first-tagged order.
pub fn build_risk_map(articles: &[Article]) -> RiskMap {
    let mut countries: Vec<CountryRisk> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for article in articles
        .iter()
        .filter(|a| a.is_crisis || a.sentiment == Sentiment::Negative)
    {
        for code in &article.country_tags {
            let slot = *index.entry(code.as_str()).or_insert_with(|| {
                countries.push(CountryRisk {
                    code: code.clone(),
                    count: 0,
                    risk_level: RiskLevel::Low,
                    articles: Vec::new(),
                });
                countries.len() - 1
            });
            let country = &mut countries[slot];
            country.count += 1;
            if country.articles.len() < MAX_SAMPLES_PER_COUNTRY {
                country.articles.push(ArticleRef {
                    title: article.title.clone(),
                    url: article.url.clone(),
                });
            }
        }
    }

    let total_crisis_countries = countries.len();
    // Stable sort keeps first-tagged order among equal counts.
    countries.sort_by(|a, b| b.count.cmp(&a.count));
    countries.truncate(MAX_COUNTRIES);
    for country in &mut countries {
        country.risk_level = RiskLevel::from_count(country.count);
    }

    RiskMap {
        countries,
        total_crisis_countries,
    }
}
