use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collected news article with its collector and AI-derived labels attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_summary: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_at_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub collected_at_utc: Option<DateTime<Utc>>,
    #[serde(default, rename = "news_type")]
    pub population: Population,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub country_tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub is_crisis: bool,
    /// GDELT event tone; lower is more severe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goldstein_scale: Option<f64>,
}

fn default_category() -> String {
    "ETC".to_string()
}

/// The KR / GLOBAL split used to balance headline selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Population {
    #[serde(rename = "KR")]
    Domestic,
    #[default]
    #[serde(rename = "GLOBAL")]
    Global,
}

impl std::fmt::Display for Population {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domestic => write!(f, "KR"),
            Self::Global => write!(f, "GLOBAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    #[serde(other)]
    Neutral,
}

/// A cluster of articles judged to report the same underlying event.
///
/// The founder is fixed at creation and supplies the display fields; later
/// members are kept in the order they joined.
#[derive(Debug, Clone)]
pub struct TitleGroup<'a> {
    founder: &'a Article,
    joined: Vec<&'a Article>,
    /// Creation order of this group within one grouping run.
    pub discovery_index: usize,
}

impl<'a> TitleGroup<'a> {
    pub fn new(founder: &'a Article, discovery_index: usize) -> Self {
        Self {
            founder,
            joined: Vec::new(),
            discovery_index,
        }
    }

    pub(crate) fn add_member(&mut self, article: &'a Article) {
        self.joined.push(article);
    }

    /// Every member, founder first.
    pub fn members(&self) -> impl Iterator<Item = &'a Article> + '_ {
        std::iter::once(self.founder).chain(self.joined.iter().copied())
    }

    pub fn representative(&self) -> &'a Article {
        self.founder
    }

    pub fn population(&self) -> Population {
        self.founder.population
    }

    pub fn size(&self) -> usize {
        1 + self.joined.len()
    }
}

/// Short trade / logistics / SCM takeaways for a headline.
///
/// Every field is optional; a failed summarizer call leaves all of them empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm: Option<String>,
}

impl Insights {
    pub fn is_empty(&self) -> bool {
        self.trade.is_none() && self.logistics.is_none() && self.scm.is_none()
    }
}

/// A selected headline, ready for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Headline {
    pub id: String,
    pub title: String,
    pub content_summary: String,
    pub source_name: String,
    pub url: String,
    pub published_at_utc: Option<DateTime<Utc>>,
    #[serde(rename = "news_type")]
    pub population: Population,
    pub group_count: usize,
    #[serde(default)]
    pub insights: Insights,
}

impl Headline {
    pub fn from_group(group: &TitleGroup<'_>) -> Self {
        let rep = group.representative();
        Self {
            id: rep.id.clone(),
            title: rep.title.clone(),
            content_summary: rep.content_summary.clone(),
            source_name: rep.source_name.clone(),
            url: rep.url.clone(),
            published_at_utc: rep.published_at_utc,
            population: rep.population,
            group_count: group.size(),
            insights: Insights::default(),
        }
    }
}

/// A wordcloud entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserializes_with_defaults() {
        let json = r#"{"title": "Busan port congestion", "url": "https://a.example/1", "news_type": "KR"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.population, Population::Domestic);
        assert_eq!(article.category, "ETC");
        assert_eq!(article.sentiment, Sentiment::Neutral);
        assert!(article.published_at_utc.is_none());
        assert!(!article.is_crisis);
    }

    #[test]
    fn test_missing_population_defaults_to_global() {
        let article: Article = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(article.population, Population::Global);
    }

    #[test]
    fn test_unknown_sentiment_is_neutral() {
        let article: Article =
            serde_json::from_str(r#"{"title": "x", "sentiment": "mixed"}"#).unwrap();
        assert_eq!(article.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_group_keeps_founder_as_representative() {
        let founder: Article =
            serde_json::from_str(r#"{"id": "f", "title": "Suez reopens", "news_type": "GLOBAL"}"#)
                .unwrap();
        let late: Article =
            serde_json::from_str(r#"{"id": "l", "title": "Suez reopens fully", "news_type": "KR"}"#)
                .unwrap();

        let mut group = TitleGroup::new(&founder, 0);
        group.add_member(&late);

        assert_eq!(group.size(), 2);
        assert_eq!(group.representative().id, "f");
        assert_eq!(group.population(), Population::Global);
        let ids: Vec<_> = group.members().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["f", "l"]);
    }

    #[test]
    fn test_empty_insights_serialize_as_empty_object() {
        let value = serde_json::to_value(Insights::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_population_display() {
        assert_eq!(Population::Domestic.to_string(), "KR");
        assert_eq!(Population::Global.to_string(), "GLOBAL");
    }
}
