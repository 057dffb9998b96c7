//! Core data models for conversation intent classification

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClassifierError;

//
// ================= Intent =================
//

/// The five intents a conversation can be classified into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intent {
    #[serde(rename = "Book Appointment")]
    BookAppointment,
    #[serde(rename = "Product Inquiry")]
    ProductInquiry,
    #[serde(rename = "Pricing Negotiation")]
    PricingNegotiation,
    #[serde(rename = "Support Request")]
    SupportRequest,
    #[serde(rename = "Follow-Up")]
    FollowUp,
}

impl Intent {
    /// All intents, in candidate-label order.
    pub const ALL: [Intent; 5] = [
        Intent::BookAppointment,
        Intent::ProductInquiry,
        Intent::PricingNegotiation,
        Intent::SupportRequest,
        Intent::FollowUp,
    ];

    /// Display label, also used as the zero-shot candidate label.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::BookAppointment => "Book Appointment",
            Intent::ProductInquiry => "Product Inquiry",
            Intent::PricingNegotiation => "Pricing Negotiation",
            Intent::SupportRequest => "Support Request",
            Intent::FollowUp => "Follow-Up",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Intent::BookAppointment => {
                "scheduling a meeting, requesting a site visit, booking a viewing, arranging an appointment"
            }
            Intent::ProductInquiry => {
                "asking about products, seeking information, exploring options, learning about features"
            }
            Intent::PricingNegotiation => {
                "discussing price, negotiating cost, requesting discount, talking about budget"
            }
            Intent::SupportRequest => {
                "reporting a problem, asking for help, fixing an issue, technical support"
            }
            Intent::FollowUp => {
                "checking previous request status, following up on earlier conversation, asking for updates"
            }
        }
    }

    pub fn candidate_labels() -> Vec<String> {
        Self::ALL.iter().map(|i| i.label().to_string()).collect()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Intent {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.label() == s)
            .ok_or_else(|| ClassifierError::InvalidModelResponse(format!("unknown intent label '{}'", s)))
    }
}

//
// ================= Conversation Input =================
//

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn new(sender: &str, text: &str) -> Self {
        Self {
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == "user"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default = "unknown_id", deserialize_with = "deserialize_id")]
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

fn unknown_id() -> String {
    "unknown".to_string()
}

/// Accepts string or numeric conversation ids; null falls back to "unknown".
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(unknown_id()),
        other => Err(de::Error::custom(format!(
            "conversation_id must be a string or number, got {}",
            other
        ))),
    }
}

//
// ================= Model Output =================
//

/// Ranked zero-shot output, highest score first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ZeroShotOutput {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotOutput {
    /// Build from unordered (label, score) pairs. Sorting is stable so
    /// equal scores keep their input order.
    pub fn from_pairs(mut pairs: Vec<(String, f64)>) -> Self {
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (labels, scores) = pairs.into_iter().unzip();
        Self { labels, scores }
    }

    pub fn top(&self) -> Option<(&str, f64)> {
        self.ranked(0)
    }

    pub fn runner_up(&self) -> Option<(&str, f64)> {
        self.ranked(1)
    }

    fn ranked(&self, index: usize) -> Option<(&str, f64)> {
        let label = self.labels.get(index)?;
        let score = self.scores.get(index)?;
        Some((label.as_str(), *score))
    }
}

//
// ================= Key Signals =================
//

/// Keyword hits per signal category, in category-table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySignals {
    entries: Vec<(&'static str, Vec<&'static str>)>,
}

impl KeySignals {
    pub fn insert(&mut self, category: &'static str, keywords: Vec<&'static str>) {
        self.entries.push((category, keywords));
    }

    pub fn get(&self, category: &str) -> Option<&[&'static str]> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, kws)| kws.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }
}

impl Serialize for KeySignals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, keywords) in &self.entries {
            map.serialize_entry(category, keywords)?;
        }
        map.end()
    }
}

//
// ================= Classification Result =================
//

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub conversation_id: String,
    pub predicted_intent: Intent,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_signals: Option<KeySignals>,
}
