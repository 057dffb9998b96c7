//! Batch pipeline
//!
//! LOAD → (PREPROCESS → CLASSIFY → EXPLAIN) per conversation → WRITE REPORTS
//!
//! A bad conversation is logged and skipped, it never aborts the batch.
//! Only an unreadable input file is fatal.

use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::classifier::IntentClassifier;
use crate::error::ClassifierError;
use crate::models::{ClassificationResult, Conversation};
use crate::preprocess::{extract_key_signals, preprocess_conversation};
use crate::report::{intent_distribution, write_csv, write_json, BatchSummary};
use crate::Result;

/// Log an info-level progress line every N conversations
const PROGRESS_EVERY: usize = 25;

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Include confidence and key signals in the reports
    pub detailed: bool,
}

/// Results of classifying a batch, before anything is written
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<ClassificationResult>,
    pub summary: BatchSummary,
}

/// Run the whole pipeline: load, classify, write both reports.
pub async fn process_conversations(
    input: &Path,
    outputs: &OutputPaths,
    classifier: &IntentClassifier,
    options: BatchOptions,
) -> Result<BatchSummary> {
    info!(input = %input.display(), model = classifier.model_name(), "Starting intent classification");

    let raw = load_conversations(input)?;
    info!("Loaded {} conversations", raw.len());

    let outcome = classify_batch(raw, classifier, options).await;
    write_reports(&outcome.results, outputs, options);

    Ok(outcome.summary)
}

/// Read the input file as a JSON array of (not yet decoded) conversations.
pub fn load_conversations(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ClassifierError::InputError(format!("cannot read {}: {}", path.display(), e))
    })?;

    match serde_json::from_str(&content)? {
        Value::Array(items) => Ok(items),
        other => Err(ClassifierError::InputError(format!(
            "expected a JSON array of conversations, found {}",
            json_kind(&other)
        ))),
    }
}

/// Classify every conversation in order.
pub async fn classify_batch(
    raw: Vec<Value>,
    classifier: &IntentClassifier,
    options: BatchOptions,
) -> BatchOutcome {
    let started_at = Utc::now();
    let start = Instant::now();
    let total = raw.len();

    let mut results = Vec::with_capacity(total);
    let mut skipped = 0;
    let mut failed = 0;

    for (index, item) in raw.into_iter().enumerate() {
        if index > 0 && index % PROGRESS_EVERY == 0 {
            info!("Classified {}/{} conversations", index, total);
        }

        let conversation: Conversation = match serde_json::from_value(item) {
            Ok(c) => c,
            Err(e) => {
                error!(index, "Skipping malformed conversation: {}", e);
                skipped += 1;
                continue;
            }
        };

        if conversation.messages.is_empty() {
            warn!(conversation_id = %conversation.conversation_id, "Empty conversation");
            skipped += 1;
            continue;
        }

        match classify_one(&conversation, classifier, options).await {
            Ok(result) => {
                debug!(
                    conversation_id = %result.conversation_id,
                    intent = %result.predicted_intent,
                    "Classified conversation"
                );
                results.push(result);
            }
            Err(e) => {
                error!(
                    conversation_id = %conversation.conversation_id,
                    "Error processing conversation: {}", e
                );
                failed += 1;
            }
        }
    }

    let summary = BatchSummary {
        started_at,
        total,
        processed: results.len(),
        skipped,
        failed,
        elapsed: start.elapsed(),
        distribution: intent_distribution(&results),
    };

    BatchOutcome { results, summary }
}

async fn classify_one(
    conversation: &Conversation,
    classifier: &IntentClassifier,
    options: BatchOptions,
) -> Result<ClassificationResult> {
    let text = preprocess_conversation(&conversation.messages);
    if text.is_empty() {
        warn!(
            conversation_id = %conversation.conversation_id,
            "No user messages, classifying on an empty request"
        );
    }

    let key_signals = extract_key_signals(&conversation.messages);
    let prediction = classifier.predict_intent(&text, &key_signals).await?;

    Ok(ClassificationResult {
        conversation_id: conversation.conversation_id.clone(),
        predicted_intent: prediction.intent,
        rationale: prediction.rationale,
        confidence: options.detailed.then_some(prediction.confidence),
        key_signals: options.detailed.then_some(key_signals),
    })
}

/// Write both reports; a failure in one is logged and does not stop the other.
pub fn write_reports(results: &[ClassificationResult], outputs: &OutputPaths, options: BatchOptions) {
    match write_json(&outputs.json, results) {
        Ok(()) => info!(path = %outputs.json.display(), "JSON output saved"),
        Err(e) => error!(path = %outputs.json.display(), "Error saving JSON: {}", e),
    }

    match write_csv(&outputs.csv, results, options.detailed) {
        Ok(()) => info!(path = %outputs.csv.display(), "CSV output saved"),
        Err(e) => error!(path = %outputs.csv.display(), "Error saving CSV: {}", e),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
