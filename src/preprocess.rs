//! Conversation preprocessing
//!
//! Flattens a message list into a single text blob for classification.
//! The most recent user turns carry the final intent, so they are repeated
//! after the `[FINAL USER INTENT]:` marker.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{KeySignals, Message};

/// Separates the recent context from the emphasized user turns.
pub const FINAL_INTENT_MARKER: &str = "[FINAL USER INTENT]:";

/// Number of trailing messages kept as context
const CONTEXT_WINDOW: usize = 6;

/// Number of trailing user messages repeated after the marker
const FINAL_USER_TURNS: usize = 2;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"http\S+|www\.\S+").unwrap();
    static ref NOISE_RE: Regex = Regex::new(r"[^\w\s?!,.'\-]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Static signal tables, category order is output order
const SIGNAL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "appointment",
        &["visit", "appointment", "schedule", "meet", "viewing", "show", "tour", "when can", "available"],
    ),
    (
        "inquiry",
        &["looking for", "tell me about", "what is", "information", "details", "available", "options"],
    ),
    (
        "pricing",
        &["price", "cost", "budget", "discount", "negotiate", "cheaper", "expensive", "afford"],
    ),
    (
        "support",
        &["problem", "issue", "help", "not working", "error", "complaint", "refund", "fix"],
    ),
    (
        "followup",
        &["follow up", "following up", "any update", "heard back", "status", "previous", "last time"],
    ),
];

/// Build the classification text for a conversation.
///
/// Returns an empty string when the conversation has no user messages.
pub fn preprocess_conversation(messages: &[Message]) -> String {
    let user_messages: Vec<String> = messages
        .iter()
        .filter(|m| m.is_user())
        .map(|m| clean_message(&m.text))
        .collect();

    if user_messages.is_empty() {
        return String::new();
    }

    let rendered: Vec<String> = messages
        .iter()
        .map(|m| format!("{}: {}", capitalize(&m.sender), clean_message(&m.text)))
        .collect();

    let recent_context = tail(&rendered, CONTEXT_WINDOW).join(" | ");
    let last_user_messages = tail(&user_messages, FINAL_USER_TURNS).join(" ");

    format!("{} {} {}", recent_context, FINAL_INTENT_MARKER, last_user_messages)
}

/// Strip URLs and stray symbols while keeping sentence punctuation.
pub fn clean_message(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = URL_RE.replace_all(text, "");
    let text = NOISE_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");

    text.trim().to_string()
}

/// Collect intent keywords mentioned by the user.
pub fn extract_key_signals(messages: &[Message]) -> KeySignals {
    let user_text = messages
        .iter()
        .filter(|m| m.is_user())
        .map(|m| m.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut signals = KeySignals::default();

    for (category, keywords) in SIGNAL_KEYWORDS {
        let detected: Vec<&'static str> = keywords
            .iter()
            .copied()
            .filter(|kw| user_text.contains(kw))
            .collect();

        if !detected.is_empty() {
            signals.insert(*category, detected);
        }
    }

    signals
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// "agent" -> "Agent", "USER" -> "User"
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(turns: &[(&str, &str)]) -> Vec<Message> {
        turns.iter().map(|(s, t)| Message::new(s, t)).collect()
    }

    #[test]
    fn test_clean_message() {
        assert_eq!(
            clean_message("Check https://example.com/listing?id=4 now!!"),
            "Check now!!"
        );
        assert_eq!(clean_message("see www.villas.ae  for more"), "see for more");
        assert_eq!(clean_message("Budget: 2M AED 😊 #dubai"), "Budget 2M AED dubai");
        assert_eq!(clean_message("It's a 3-bed, right?"), "It's a 3-bed, right?");
        assert_eq!(clean_message(""), "");
    }

    #[test]
    fn test_preprocess_emphasizes_last_user_turns() {
        let messages = conversation(&[
            ("user", "Hi, looking for a 2BHK"),
            ("agent", "Sure, which area?"),
            ("user", "Marina please"),
            ("agent", "We have two options"),
            ("user", "Can we visit tomorrow?"),
        ]);

        let text = preprocess_conversation(&messages);
        assert_eq!(
            text,
            "User: Hi, looking for a 2BHK | Agent: Sure, which area? | User: Marina please | \
             Agent: We have two options | User: Can we visit tomorrow? \
             [FINAL USER INTENT]: Marina please Can we visit tomorrow?"
        );
    }

    #[test]
    fn test_preprocess_keeps_last_six_messages() {
        let messages: Vec<Message> = (0..8)
            .map(|i| Message::new(if i % 2 == 0 { "user" } else { "agent" }, &format!("m{}", i)))
            .collect();

        let text = preprocess_conversation(&messages);
        assert!(text.starts_with("User: m2 | Agent: m3"));
        assert!(!text.contains("m1 "));
        assert!(text.ends_with("[FINAL USER INTENT]: m4 m6"));
    }

    #[test]
    fn test_preprocess_without_user_messages() {
        assert_eq!(preprocess_conversation(&[]), "");
        let agent_only = conversation(&[("agent", "Hello, how can I help?")]);
        assert_eq!(preprocess_conversation(&agent_only), "");
    }

    #[test]
    fn test_extract_key_signals() {
        let messages = conversation(&[
            ("user", "What is the PRICE of the villa?"),
            ("agent", "It has a great discount"),
            ("user", "Is it available for a tour?"),
        ]);

        let signals = extract_key_signals(&messages);
        assert_eq!(signals.get("appointment"), Some(&["tour", "available"][..]));
        assert_eq!(signals.get("inquiry"), Some(&["what is", "available"][..]));
        assert_eq!(signals.get("pricing"), Some(&["price"][..]));
        assert!(signals.get("support").is_none());
        assert_eq!(
            signals.categories().collect::<Vec<_>>(),
            vec!["appointment", "inquiry", "pricing"]
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("agent"), "Agent");
        assert_eq!(capitalize("USER"), "User");
        assert_eq!(capitalize(""), "");
    }
}
