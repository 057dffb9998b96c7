//! Conversation Intent Classifier
//!
//! Classifies multi-turn sales chats into one of five intents:
//! - Preprocesses messages into a blob that emphasizes the final user turns
//! - Ranks intents with an external zero-shot model
//! - Overrides low-confidence predictions with regex pattern evidence
//! - Explains every label with a templated rationale
//!
//! BATCH LOOP:
//! LOAD → PREPROCESS → CLASSIFY → BOOST → EXPLAIN → REPORT

pub mod classifier;
pub mod config;
pub mod error;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod rationale;
pub mod report;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{IntentClassifier, Prediction};
pub use config::{Backend, Config};
