//! Keyword Classifier
//!
//! Offline, deterministic stand-in for the zero-shot model. Scores each known
//! intent label by keyword hits and normalises the hits into a distribution.

use super::{rank, IntentClassifier};
use crate::models::{Intent, LabelScore};
use crate::Result;
use async_trait::async_trait;

/// Static keyword lists, matched per intent
const COUNT_KEYWORDS: &[&str] = &[
    "how many", "count", "number", "total", "quantity", "amount",
    "trades", "holdings", "positions",
];

const PERFORMANCE_KEYWORDS: &[&str] = &[
    "profit", "loss", "p&l", "pnl", "performance", "performing",
    "return", "returns", "gain", "best", "worst", "better", "ytd",
];

const GREETING_KEYWORDS: &[&str] = &[
    "hello", "hi", "hey", "greetings", "good morning", "good afternoon",
    "good evening", "thanks", "thank you",
];

const DETAIL_KEYWORDS: &[&str] = &[
    "who", "manager", "managers", "ceo", "sector", "industry", "strategy",
    "custodian", "address",
];

fn keywords_for(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::CountRecords => COUNT_KEYWORDS,
        Intent::Performance => PERFORMANCE_KEYWORDS,
        Intent::Greeting => GREETING_KEYWORDS,
        Intent::UnknownDetails => DETAIL_KEYWORDS,
    }
}

/// Keyword-hit intent classifier
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Hits per candidate label, in candidate order
    fn hits(text: &str, candidate_labels: &[&str]) -> Vec<usize> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '&'))
            .filter(|t| !t.is_empty())
            .collect();

        let mut hits: Vec<usize> = candidate_labels
            .iter()
            .map(|label| match Intent::from_label(label) {
                Some(intent) => keywords_for(intent)
                    .iter()
                    .filter(|kw| matches_keyword(&lowered, &tokens, kw))
                    .count(),
                None => 0,
            })
            .collect();

        // Nothing recognised: the catch-all label absorbs the question
        if hits.iter().all(|h| *h == 0) {
            if let Some(index) = candidate_labels
                .iter()
                .position(|label| *label == Intent::UnknownDetails.label())
            {
                hits[index] = 1;
            }
        }

        hits
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<Vec<LabelScore>> {
        if candidate_labels.is_empty() {
            return Ok(Vec::new());
        }

        let hits = Self::hits(text, candidate_labels);
        let total: usize = hits.iter().sum();

        let scores = candidate_labels
            .iter()
            .zip(hits)
            .map(|(label, h)| {
                let score = if total == 0 {
                    1.0 / candidate_labels.len() as f64
                } else {
                    h as f64 / total as f64
                };
                LabelScore::new(*label, score)
            })
            .collect();

        Ok(rank(scores))
    }
}

/// Single words match whole tokens; phrases and symbols match as substrings
fn matches_keyword(lowered: &str, tokens: &[&str], keyword: &str) -> bool {
    if keyword.chars().all(char::is_alphanumeric) {
        tokens.contains(&keyword)
    } else {
        lowered.contains(keyword)
    }
}
