//! Intent classifier trait and implementations
//!
//! The resolver only ever looks at the top-ranked label and its score, so any
//! ranking source can sit behind this seam: a remote zero-shot model, an
//! offline keyword scorer, or a fixed stub.

use crate::models::LabelScore;
use crate::Result;
use async_trait::async_trait;

pub mod keyword;
pub mod zero_shot;

pub use keyword::KeywordClassifier;
pub use zero_shot::ZeroShotClient;

/// Ranks candidate labels for a piece of text
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return every candidate with a score in [0, 1], highest first
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<Vec<LabelScore>>;
}

/// Sort descending by score; ties keep their incoming order
pub fn rank(mut scores: Vec<LabelScore>) -> Vec<LabelScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Fixed-output classifier for development & testing
/// Keeps routing testable without a model
pub struct MockClassifier {
    label: String,
    score: f64,
}

impl MockClassifier {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score: score.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn classify(&self, _text: &str, candidate_labels: &[&str]) -> Result<Vec<LabelScore>> {
        let others: Vec<&str> = candidate_labels
            .iter()
            .copied()
            .filter(|label| *label != self.label)
            .collect();

        let remainder = if others.is_empty() {
            0.0
        } else {
            (1.0 - self.score) / others.len() as f64
        };

        let mut ranked = Vec::with_capacity(others.len() + 1);
        ranked.push(LabelScore::new(self.label.clone(), self.score));
        ranked.extend(others.into_iter().map(|label| LabelScore::new(label, remainder)));

        Ok(ranked)
    }
}
