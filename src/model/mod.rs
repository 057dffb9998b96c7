//! Zero-shot model trait and implementations
//!
//! The model is an external collaborator: it ranks candidate labels for a
//! piece of text. Everything above this seam is deterministic.

use crate::models::{Intent, ZeroShotOutput};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;

pub mod huggingface;
pub use huggingface::HuggingFaceModel;

/// Input to a zero-shot classification call
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroShotRequest {
    pub sequence: String,
    pub candidate_labels: Vec<String>,
    /// Template with a `{}` placeholder for each candidate label
    pub hypothesis_template: String,
    pub multi_label: bool,
}

/// Trait for zero-shot label ranking
#[async_trait]
pub trait ZeroShotModel: Send + Sync {
    /// Rank the candidate labels, highest score first
    async fn classify(&self, request: &ZeroShotRequest) -> Result<ZeroShotOutput>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Offline keyword-overlap model for development & testing
/// Keeps the pipeline functional without an inference endpoint
pub struct KeywordModel;

/// Words too generic to count as evidence for any label. The request
/// framing ("Customer's final request: ...") must never score.
const STOP_WORDS: &[&str] = &[
    "about", "asking", "for", "on", "up", "an", "a",
    "customer", "final", "request", "requesting",
];

/// Prefix length used to match word variants ("schedule" / "scheduling")
const STEM_LEN: usize = 5;

impl KeywordModel {
    fn label_terms(label: &str) -> Vec<String> {
        let mut text = label.to_lowercase();
        if let Ok(intent) = label.parse::<Intent>() {
            text.push(' ');
            text.push_str(intent.description());
        }

        let mut seen = HashSet::new();
        words(&text)
            .filter(|w| !STOP_WORDS.contains(w))
            .map(stem)
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }

    fn score_counts(counts: &[usize]) -> Vec<f64> {
        let exps: Vec<f64> = counts.iter().map(|c| (*c as f64).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.iter().map(|e| e / total).collect()
    }
}

#[async_trait]
impl ZeroShotModel for KeywordModel {
    async fn classify(&self, request: &ZeroShotRequest) -> Result<ZeroShotOutput> {
        let lowered = request.sequence.to_lowercase();
        let sequence_stems: HashSet<String> = words(&lowered).map(stem).collect();

        let counts: Vec<usize> = request
            .candidate_labels
            .iter()
            .map(|label| {
                Self::label_terms(label)
                    .iter()
                    .filter(|term| sequence_stems.contains(*term))
                    .count()
            })
            .collect();

        let scores = Self::score_counts(&counts);

        Ok(ZeroShotOutput::from_pairs(
            request.candidate_labels.iter().cloned().zip(scores).collect(),
        ))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn stem(word: &str) -> String {
    word.chars().take(STEM_LEN).collect()
}
