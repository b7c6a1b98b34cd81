//! Balanced headline selection.
//!
//! Ranks title groups by coverage and takes the top groups of each
//! population independently, so a quiet day abroad never crowds out
//! domestic stories (or the reverse).

use std::cmp::Ordering;

use tracing::info;

use crate::news::models::{Headline, Population, TitleGroup};

/// Default number of headlines per population.
pub const DEFAULT_PER_POPULATION_LIMIT: usize = 3;

/// Coverage ranking: larger groups first, then the more recent
/// representative (undated last), then earlier-discovered groups.
fn rank(a: &TitleGroup<'_>, b: &TitleGroup<'_>) -> Ordering {
    b.size()
        .cmp(&a.size())
        .then_with(|| {
            b.representative()
                .published_at_utc
                .cmp(&a.representative().published_at_utc)
        })
        .then_with(|| a.discovery_index.cmp(&b.discovery_index))
}

/// Pick up to `per_population_limit` headlines for each population.
///
/// Output lists Domestic headlines first, then Global, each in rank order.
/// A population with fewer groups than the limit is not topped up from the other.
pub fn select_headlines(groups: &[TitleGroup<'_>], per_population_limit: usize) -> Vec<Headline> {
    let mut ranked: Vec<&TitleGroup<'_>> = groups.iter().collect();
    ranked.sort_by(|a, b| rank(a, b));

    let capacity = per_population_limit.saturating_mul(2).min(groups.len());
    let mut headlines = Vec::with_capacity(capacity);
    for population in [Population::Domestic, Population::Global] {
        let before = headlines.len();
        headlines.extend(
            ranked
                .iter()
                .filter(|g| g.population() == population)
                .take(per_population_limit)
                .map(|g| Headline::from_group(g)),
        );
        info!(
            population = %population,
            selected = headlines.len() - before,
            limit = per_population_limit,
            "Headlines selected"
        );
    }

    headlines
}
