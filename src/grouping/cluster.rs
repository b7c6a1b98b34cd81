//! Near-duplicate article grouping.
//!
//! Single greedy pass: each article is compared only against the founding
//! article of every existing group and joins the first one that is similar
//! enough. Cost is O(n·g) and membership depends on input order.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::ConfigError;
use crate::grouping::similarity::jaccard;
use crate::grouping::tokenize::tokenize;
use crate::news::models::{Article, TitleGroup};

/// Default similarity threshold for grouping titles.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Reject thresholds outside `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold(threshold))
    }
}

/// Partition `articles` into title groups.
///
/// An article joins the earliest-formed group whose representative title has
/// Jaccard similarity `>= threshold` and at least one shared token. Articles
/// whose titles normalize to nothing always stay alone.
pub fn group_articles(
    articles: &[Article],
    threshold: f64,
) -> Result<Vec<TitleGroup<'_>>, ConfigError> {
    validate_threshold(threshold)?;

    let mut groups: Vec<TitleGroup<'_>> = Vec::new();
    // Token set of each group's representative, parallel to `groups`.
    let mut rep_tokens: Vec<BTreeSet<String>> = Vec::new();

    for article in articles {
        let tokens = tokenize(&article.title);

        let matched = if tokens.is_empty() {
            None
        } else {
            rep_tokens.iter().position(|rep| {
                !rep.is_disjoint(&tokens) && jaccard(rep, &tokens) >= threshold
            })
        };

        match matched {
            Some(idx) => groups[idx].add_member(article),
            None => {
                groups.push(TitleGroup::new(article, groups.len()));
                rep_tokens.push(tokens);
            }
        }
    }

    if let Some(largest) = groups.iter().map(TitleGroup::size).max() {
        debug!(
            articles = articles.len(),
            groups = groups.len(),
            largest,
            threshold,
            "Title grouping complete"
        );
    }

    Ok(groups)
}
