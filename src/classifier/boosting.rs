//! Pattern boosting
//!
//! Regex evidence that overrides low-confidence model predictions.
//! Rules are evaluated in a fixed order and the first one that fires wins:
//!
//! 1. Two or more patterns of a single intent match and the model was unsure (< 0.6)
//! 2. An explicit meeting request ("can we ... visit") and the model was not sure (< 0.7)
//! 3. An explicit discount request ("can you ... cheaper") and the model was not sure (< 0.7)

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::Intent;

/// Minimum pattern hits before rule 1 is considered
const MIN_PATTERN_MATCHES: usize = 2;
const PATTERN_OVERRIDE_THRESHOLD: f64 = 0.6;
const PATTERN_OVERRIDE_SCORE: f64 = 0.75;

const PHRASE_OVERRIDE_THRESHOLD: f64 = 0.7;
const APPOINTMENT_OVERRIDE_SCORE: f64 = 0.80;
const NEGOTIATION_OVERRIDE_SCORE: f64 = 0.75;

/// Patterns compiled for a single intent
struct IntentPatterns {
    intent: Intent,
    patterns: Vec<Regex>,
}

impl IntentPatterns {
    fn new(intent: Intent, sources: &[&str]) -> Self {
        Self {
            intent,
            patterns: sources.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }

    fn match_count(&self, text: &str) -> usize {
        self.patterns.iter().filter(|p| p.is_match(text)).count()
    }
}

lazy_static! {
    /// Table order breaks ties between intents with equal match counts.
    static ref STRONG_PATTERNS: Vec<IntentPatterns> = vec![
        IntentPatterns::new(Intent::BookAppointment, &[
            r"\b(schedule|book|appointment|visit|viewing|meet|tour|site visit|show)\b",
            r"\b(when can|can we|let's meet|available for|free on)\b",
            r"\b(tomorrow|today|this week|next week|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        ]),
        IntentPatterns::new(Intent::PricingNegotiation, &[
            r"\b(price|cost|budget|expensive|cheaper|discount|negotiate|afford)\b",
            r"\b(can you do|offer|reduce|lower|best price|negotiation)\b",
            r"\b(max|maximum|within|under)\b.*\b(aed|usd|dollar|k|thousand)\b",
        ]),
        IntentPatterns::new(Intent::SupportRequest, &[
            r"\b(problem|issue|error|broken|not working|help|fix|complaint)\b",
            r"\b(refund|cancel|wrong|incorrect|mistake)\b",
            r"\b(payment.*error|gateway.*error|booking.*error)\b",
        ]),
        IntentPatterns::new(Intent::ProductInquiry, &[
            r"\b(what|which|tell me|information|details|available|options)\b",
            r"\b(looking for|interested in|want to know|show me)\b",
            r"\b(features|amenities|specifications|include)\b",
        ]),
        IntentPatterns::new(Intent::FollowUp, &[
            r"\b(follow.*up|following up|any update|heard back|status)\b",
            r"\b(last time|previous|earlier|last week|last month)\b",
            r"\b(still waiting|any news|any progress)\b",
        ]),
    ];

    static ref APPOINTMENT_REQUEST_RE: Regex = Regex::new(
        r"\b(can we|when can|let's|schedule|book|arrange).*\b(visit|viewing|appointment|meet|tour)\b"
    ).unwrap();

    static ref NEGOTIATION_REQUEST_RE: Regex = Regex::new(
        r"\b(can you|offer|give me).*\b(discount|better price|lower|cheaper)\b"
    ).unwrap();
}

/// Pattern hit counts per intent, in table order
pub fn pattern_scores(text: &str) -> Vec<(Intent, usize)> {
    let lowered = text.to_lowercase();
    STRONG_PATTERNS
        .iter()
        .map(|entry| (entry.intent, entry.match_count(&lowered)))
        .collect()
}

/// Apply the override rules to a model prediction.
///
/// Returns the prediction unchanged when no rule fires. The text is the
/// full preprocessed conversation, not just the final user turns.
pub fn apply_pattern_boosting(text: &str, predicted: Intent, score: f64) -> (Intent, f64) {
    // First maximum wins, so ties resolve in table order
    let best = pattern_scores(text)
        .into_iter()
        .fold(None, |best: Option<(Intent, usize)>, (intent, count)| match best {
            Some((_, best_count)) if count <= best_count => best,
            _ => Some((intent, count)),
        });

    if let Some((best_intent, best_count)) = best {
        if best_count >= MIN_PATTERN_MATCHES
            && best_intent != predicted
            && score < PATTERN_OVERRIDE_THRESHOLD
        {
            debug!(
                from = %predicted,
                to = %best_intent,
                matches = best_count,
                "Pattern evidence overrides model prediction"
            );
            return (best_intent, PATTERN_OVERRIDE_SCORE);
        }
    }

    let lowered = text.to_lowercase();
    if APPOINTMENT_REQUEST_RE.is_match(&lowered)
        && predicted != Intent::BookAppointment
        && score < PHRASE_OVERRIDE_THRESHOLD
    {
        debug!(from = %predicted, "Meeting request overrides model prediction");
        return (Intent::BookAppointment, APPOINTMENT_OVERRIDE_SCORE);
    }

    if NEGOTIATION_REQUEST_RE.is_match(&lowered)
        && predicted != Intent::PricingNegotiation
        && score < PHRASE_OVERRIDE_THRESHOLD
    {
        debug!(from = %predicted, "Discount request overrides model prediction");
        return (Intent::PricingNegotiation, NEGOTIATION_OVERRIDE_SCORE);
    }

    (predicted, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_scores() {
        let scores = pattern_scores("Can we VISIT the villa tomorrow?");
        assert_eq!(scores[0], (Intent::BookAppointment, 3));
        assert_eq!(scores[1], (Intent::PricingNegotiation, 0));
    }

    #[test]
    fn test_low_confidence_overridden_by_pattern_evidence() {
        let text = "User: my payment failed with a gateway error, please help";
        let (intent, score) = apply_pattern_boosting(text, Intent::ProductInquiry, 0.41);
        assert_eq!(intent, Intent::SupportRequest);
        assert_eq!(score, 0.75);
    }

    #[test]
    fn test_confident_prediction_kept() {
        let text = "User: my payment failed with a gateway error, please help";
        let (intent, score) = apply_pattern_boosting(text, Intent::ProductInquiry, 0.65);
        assert_eq!(intent, Intent::ProductInquiry);
        assert_eq!(score, 0.65);

        // Nothing fires at or above 0.7
        let text = "can we schedule a visit tomorrow";
        let (intent, score) = apply_pattern_boosting(text, Intent::FollowUp, 0.7);
        assert_eq!(intent, Intent::FollowUp);
        assert_eq!(score, 0.7);
    }

    #[test]
    fn test_matching_prediction_not_rescored() {
        let text = "can we schedule a visit tomorrow";
        let (intent, score) = apply_pattern_boosting(text, Intent::BookAppointment, 0.3);
        assert_eq!(intent, Intent::BookAppointment);
        assert_eq!(score, 0.3);
    }

    #[test]
    fn test_tie_resolves_in_table_order() {
        // Two appointment patterns and two pricing patterns
        let text = "when can we discuss the budget? maybe the best price tomorrow";
        let scores = pattern_scores(text);
        assert_eq!(scores[0].1, 2);
        assert_eq!(scores[1].1, 2);

        let (intent, score) = apply_pattern_boosting(text, Intent::FollowUp, 0.5);
        assert_eq!(intent, Intent::BookAppointment);
        assert_eq!(score, 0.75);
    }

    #[test]
    fn test_appointment_phrase_override() {
        // Single pattern hit per intent, so only the phrase rule can fire
        let text = "let's arrange something to meet";
        let best = pattern_scores(text).iter().map(|(_, c)| *c).max().unwrap();
        assert!(best < 2);

        let (intent, score) = apply_pattern_boosting(text, Intent::ProductInquiry, 0.65);
        assert_eq!(intent, Intent::BookAppointment);
        assert_eq!(score, 0.80);
    }

    #[test]
    fn test_negotiation_phrase_override() {
        let text = "give me a deal, cheaper would be nice";
        let (intent, score) = apply_pattern_boosting(text, Intent::ProductInquiry, 0.62);
        assert_eq!(intent, Intent::PricingNegotiation);
        assert_eq!(score, 0.75);
    }

    #[test]
    fn test_no_evidence_keeps_prediction() {
        let (intent, score) = apply_pattern_boosting("hello there", Intent::FollowUp, 0.21);
        assert_eq!(intent, Intent::FollowUp);
        assert_eq!(score, 0.21);
    }

    #[test]
    fn test_negotiation_phrase_fires_after_earlier_rules_pass() {
        // Appointment evidence agrees with the prediction, so only the
        // discount request can move it
        let text = "can we visit tomorrow? can you give me a discount";
        let (intent, score) = apply_pattern_boosting(text, Intent::BookAppointment, 0.5);
        assert_eq!(intent, Intent::PricingNegotiation);
        assert_eq!(score, 0.75);
    }

    #[test]
    fn test_budget_limit_pattern() {
        let pricing = |text: &str| pattern_scores(text)[1];

        assert_eq!(pricing("our max is 2.9M AED"), (Intent::PricingNegotiation, 1));
        // No word boundary between digits and the unit
        assert_eq!(pricing("under 500k"), (Intent::PricingNegotiation, 0));

        let (intent, score) =
            apply_pattern_boosting("budget is within 500 thousand", Intent::FollowUp, 0.4);
        assert_eq!(intent, Intent::PricingNegotiation);
        assert_eq!(score, 0.75);
    }
}
