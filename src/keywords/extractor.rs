//! Wordcloud keyword extraction.
//!
//! Candidate phrases are contiguous 1–3 word n-grams taken clause by clause
//! from each article's title and summary. Filler words are trimmed from the
//! phrase edges, generic terms are dropped, and each phrase is counted once
//! per article it appears in.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::KeywordConfig;
use crate::grouping::tokenize::{words, Word};
use crate::news::models::{Article, Keyword};

const MAX_NGRAM: usize = 3;

/// Characters that always end a clause. '.' is handled separately so that
/// decimals and abbreviations survive.
const CLAUSE_BREAKS: &[char] = &[
    ',', ';', ':', '!', '?', '|', '·', '…', '\n', '"', '“', '”', '(', ')', '[', ']', '《', '》',
];

#[derive(Debug)]
struct Tally {
    count: usize,
    first_seen: usize,
    word_count: usize,
    always_capitalized: bool,
}

impl Tally {
    /// Lower tiers rank first: trigrams, bigrams, proper-noun-like words, other words.
    fn tier(&self) -> u8 {
        match self.word_count {
            3 => 0,
            2 => 1,
            _ if self.always_capitalized => 2,
            _ => 3,
        }
    }
}

struct Candidate {
    text: String,
    word_count: usize,
    capitalized: bool,
}

/// Extract the top keyword phrases across a batch of articles.
pub fn extract_keywords(articles: &[Article], config: &KeywordConfig) -> Vec<Keyword> {
    let stoplist: HashSet<String> = config.stoplist.iter().map(|s| normalize_phrase(s)).collect();
    let mut fillers: Vec<Vec<String>> = config
        .fillers
        .iter()
        .map(|f| words(f).into_iter().map(|w| w.text).collect::<Vec<_>>())
        .filter(|f| !f.is_empty())
        .collect();
    // Longest filler first so "port of" wins over "of".
    fillers.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for article in articles {
        let mut seen_in_article: HashSet<String> = HashSet::new();

        for candidate in article_candidates(article, &fillers, &stoplist) {
            let next_index = tallies.len();
            let tally = tallies.entry(candidate.text.clone()).or_insert(Tally {
                count: 0,
                first_seen: next_index,
                word_count: candidate.word_count,
                always_capitalized: true,
            });
            tally.always_capitalized &= candidate.capitalized;
            if seen_in_article.insert(candidate.text) {
                tally.count += 1;
            }
        }
    }

    let mut ranked: Vec<(String, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        a.tier()
            .cmp(&b.tier())
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });

    debug!(
        articles = articles.len(),
        candidates = ranked.len(),
        top_n = config.top_n,
        "Keyword extraction complete"
    );

    ranked
        .into_iter()
        .take(config.top_n)
        .map(|(text, tally)| Keyword {
            text,
            count: tally.count,
        })
        .collect()
}

/// Every surviving candidate of one article, in reading order.
fn article_candidates(
    article: &Article,
    fillers: &[Vec<String>],
    stoplist: &HashSet<String>,
) -> Vec<Candidate> {
    let mut out = Vec::new();

    for text in [article.title.as_str(), article.content_summary.as_str()] {
        for clause in split_clauses(text) {
            let clause_words = words(clause);
            for start in 0..clause_words.len() {
                for n in 1..=MAX_NGRAM {
                    let Some(window) = clause_words.get(start..start + n) else {
                        break;
                    };
                    let trimmed = trim_fillers(window, fillers);
                    if trimmed.is_empty() {
                        continue;
                    }
                    let text = join_words(trimmed);
                    if !is_keyword(trimmed, &text, stoplist) {
                        continue;
                    }
                    out.push(Candidate {
                        text,
                        word_count: trimmed.len(),
                        capitalized: trimmed.iter().all(|w| w.capitalized),
                    });
                }
            }
        }
    }

    out
}

/// Split text at clause punctuation.
///
/// A period only ends a clause when it is followed by whitespace (or the end
/// of text) and the word it closes has no other period, so "3.5" and "U.S."
/// stay inside their clause.
fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let breaks = CLAUSE_BREAKS.contains(&c)
            || (c == '.'
                && chars.peek().map_or(true, |(_, next)| next.is_whitespace())
                && !closes_abbreviation(&text[start..i]));
        if breaks {
            clauses.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    clauses.push(&text[start..]);

    clauses.retain(|c| !c.trim().is_empty());
    clauses
}

fn closes_abbreviation(before: &str) -> bool {
    before
        .rsplit(char::is_whitespace)
        .next()
        .is_some_and(|word| word.contains('.'))
}

/// Repeatedly strip filler phrases from both ends of `window`.
fn trim_fillers<'w>(mut window: &'w [Word], fillers: &[Vec<String>]) -> &'w [Word] {
    loop {
        let before = window.len();

        if let Some(f) = fillers.iter().find(|f| starts_with(window, f)) {
            window = &window[f.len()..];
        }
        if let Some(f) = fillers.iter().find(|f| ends_with(window, f)) {
            window = &window[..window.len() - f.len()];
        }

        if window.len() == before || window.is_empty() {
            return window;
        }
    }
}

fn starts_with(window: &[Word], filler: &[String]) -> bool {
    window.len() >= filler.len() && window.iter().zip(filler).all(|(w, f)| &w.text == f)
}

fn ends_with(window: &[Word], filler: &[String]) -> bool {
    window.len() >= filler.len()
        && window[window.len() - filler.len()..]
            .iter()
            .zip(filler)
            .all(|(w, f)| &w.text == f)
}

fn is_keyword(phrase: &[Word], text: &str, stoplist: &HashSet<String>) -> bool {
    if stoplist.contains(text) {
        return false;
    }
    if phrase.iter().all(|w| w.text.chars().all(|c| c.is_numeric())) {
        return false;
    }
    // Stray Latin letters left over from abbreviations.
    !(phrase.len() == 1 && phrase[0].text.len() == 1 && phrase[0].text.is_ascii())
}

fn join_words(ws: &[Word]) -> String {
    ws.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Normalize a configured phrase the same way article text is normalized.
fn normalize_phrase(phrase: &str) -> String {
    join_words(&words(phrase))
}
