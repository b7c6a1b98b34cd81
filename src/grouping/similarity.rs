use std::collections::BTreeSet;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`.
///
/// Two empty sets score 0.0 so malformed titles never look alike.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}
