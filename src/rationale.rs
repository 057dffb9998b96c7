//! Rationale generation
//!
//! Template-based, one-line explanations for a final intent label.

use crate::models::Intent;

const CONFIDENT_ABOVE: f64 = 0.7;
const PLAIN_ABOVE: f64 = 0.55;

/// Runner-up is mentioned when it scores above this...
const ALTERNATIVE_MIN_SCORE: f64 = 0.25;
/// ...and lands within this distance of the final score
const ALTERNATIVE_MAX_GAP: f64 = 0.25;

/// Evidence template for one intent
struct EvidenceTemplate {
    keywords: &'static [&'static str],
    max_shown: usize,
    with_keywords: &'static str,
    fallback: &'static str,
}

fn template_for(intent: Intent) -> EvidenceTemplate {
    match intent {
        Intent::BookAppointment => EvidenceTemplate {
            keywords: &[
                "visit", "appointment", "schedule", "meet", "viewing", "show", "tour",
                "site visit", "when can", "tomorrow", "this week", "next week", "available",
            ],
            max_shown: 3,
            with_keywords: "User explicitly requested scheduling/viewing with keywords",
            fallback: "Conversation indicates readiness to proceed with in-person meeting",
        },
        Intent::ProductInquiry => EvidenceTemplate {
            keywords: &[
                "looking for", "tell me", "what", "information", "details", "available",
                "options", "interested", "features", "amenities",
            ],
            max_shown: 3,
            with_keywords: "User is seeking information, indicated by",
            fallback: "User is exploring options and gathering product information",
        },
        Intent::PricingNegotiation => EvidenceTemplate {
            keywords: &[
                "budget", "price", "cost", "expensive", "cheaper", "discount", "negotiate",
                "afford", "max", "can you do",
            ],
            max_shown: 3,
            with_keywords: "Discussion centers on pricing/budget",
            fallback: "Conversation focused on financial aspects and pricing",
        },
        Intent::SupportRequest => EvidenceTemplate {
            keywords: &[
                "problem", "issue", "help", "not working", "error", "complaint", "fix",
                "broken", "wrong",
            ],
            max_shown: 3,
            with_keywords: "User needs assistance with",
            fallback: "User is seeking help or reporting an issue",
        },
        Intent::FollowUp => EvidenceTemplate {
            keywords: &[
                "follow up", "following up", "any update", "status", "heard back", "previous",
                "earlier", "last time",
            ],
            max_shown: 2,
            with_keywords: "User is checking status of previous interaction",
            fallback: "User is following up on a previous conversation",
        },
    }
}

fn confidence_phrase(score: f64) -> &'static str {
    if score > CONFIDENT_ABOVE {
        "confidently classified"
    } else if score > PLAIN_ABOVE {
        "classified"
    } else {
        "tentatively classified"
    }
}

/// Explain a classification.
///
/// `runner_up` is the model's second-ranked label and score. It is noted only
/// when close to the final score and not the final intent itself.
pub fn generate_rationale(
    text: &str,
    intent: Intent,
    score: f64,
    runner_up: Option<(&str, f64)>,
) -> String {
    let lowered = text.to_lowercase();
    let template = template_for(intent);

    let mut parts = Vec::with_capacity(2);

    let found = find_keywords(&lowered, template.keywords);
    if found.is_empty() {
        parts.push(template.fallback.to_string());
    } else {
        let shown = &found[..found.len().min(template.max_shown)];
        parts.push(format!("{}: {}", template.with_keywords, shown.join(", ")));
    }

    if let Some((second, second_score)) = runner_up {
        if second != intent.label()
            && second_score > ALTERNATIVE_MIN_SCORE
            && (score - second_score).abs() < ALTERNATIVE_MAX_GAP
        {
            parts.push(format!(
                "Note: '{}' was also considered (score: {:.2})",
                second, second_score
            ));
        }
    }

    format!(
        "The conversation was {} as '{}' (confidence: {:.2}). {}",
        confidence_phrase(score),
        intent,
        score,
        parts.join(" ")
    )
}

/// Keywords that occur in `text`, in list order
pub fn find_keywords<'a>(text: &str, keywords: &[&'a str]) -> Vec<&'a str> {
    keywords
        .iter()
        .copied()
        .filter(|kw| text.contains(kw))
        .collect()
}
