//! Intent Classifier
//!
//! Sends the emphasized final user turns to the zero-shot model, corrects
//! low-confidence predictions with pattern boosting, and explains the result.

use tracing::debug;

use crate::error::ClassifierError;
use crate::model::{ZeroShotModel, ZeroShotRequest};
use crate::models::{Intent, KeySignals};
use crate::preprocess::FINAL_INTENT_MARKER;
use crate::rationale::generate_rationale;
use crate::Result;

pub mod boosting;
pub use boosting::apply_pattern_boosting;

pub const HYPOTHESIS_TEMPLATE: &str = "This customer wants to {}.";

/// Final label for one conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub intent: Intent,
    /// Model score, or the override score when boosting fired
    pub confidence: f64,
    pub rationale: String,
    /// What the model said before boosting
    pub model_intent: Intent,
    pub model_score: f64,
}

impl Prediction {
    pub fn was_boosted(&self) -> bool {
        self.intent != self.model_intent || self.confidence != self.model_score
    }
}

pub struct IntentClassifier {
    model: Box<dyn ZeroShotModel>,
}

impl IntentClassifier {
    pub fn new(model: Box<dyn ZeroShotModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Classify a preprocessed conversation.
    ///
    /// Key signals are logged for context only, they never change the label.
    pub async fn predict_intent(
        &self,
        conversation_text: &str,
        key_signals: &KeySignals,
    ) -> Result<Prediction> {
        let request = build_request(conversation_text);
        let output = self.model.classify(&request).await?;

        let (top_label, top_score) = output.top().ok_or_else(|| {
            ClassifierError::InvalidModelResponse("model returned no labels".to_string())
        })?;
        let model_intent: Intent = top_label.parse()?;

        let (intent, confidence) =
            apply_pattern_boosting(conversation_text, model_intent, top_score);

        let rationale = generate_rationale(
            conversation_text,
            intent,
            confidence,
            output.runner_up(),
        );

        debug!(
            model_intent = %model_intent,
            model_score = top_score,
            intent = %intent,
            confidence,
            signals = ?key_signals.categories().collect::<Vec<_>>(),
            "Conversation classified"
        );

        Ok(Prediction {
            intent,
            confidence,
            rationale,
            model_intent,
            model_score: top_score,
        })
    }
}

/// Text after the last final-intent marker, or the whole text
pub fn final_context(conversation_text: &str) -> &str {
    match conversation_text.rsplit_once(FINAL_INTENT_MARKER) {
        Some((_, tail)) => tail.trim(),
        None => conversation_text,
    }
}

pub fn build_request(conversation_text: &str) -> ZeroShotRequest {
    ZeroShotRequest {
        sequence: format!("Customer's final request: {}", final_context(conversation_text)),
        candidate_labels: Intent::candidate_labels(),
        hypothesis_template: HYPOTHESIS_TEMPLATE.to_string(),
        multi_label: false,
    }
}
