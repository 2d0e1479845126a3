//! # Explanation Builder Module
//!
//! ## Purpose
//! Composes the short "why it fits" narrative justifying the best-fit case:
//! a doctrinal lead sentence, the matched fact-pattern concepts, a synthesis
//! of the case's own snippets, and optionally a cross-case doctrinal pattern
//! from the secondary commentary source.
//!
//! ## Input/Output Specification
//! - **Input**: The best-fit `CaseResult`, the query, the rule token, and
//!   optional commentary phrases
//! - **Output**: 1–4 ordered narrative strings; never empty — the lead
//!   sentence is always present

use crate::rules::{doctrinal_framing, fact_pattern_concepts};
use crate::{CaseQuery, CaseResult};

/// Maximum number of explanation entries
const MAX_ENTRIES: usize = 4;

/// Length bounds for a commentary phrase worth quoting
const CONTEXT_PHRASE_MIN: usize = 60;
const CONTEXT_PHRASE_MAX: usize = 260;

/// Doctrinal phrases extracted from the secondary commentary source. Never
/// used as cases; only to enrich explanations.
#[derive(Debug, Clone, Default)]
pub struct CommentaryContext {
    pub phrases: Vec<String>,
}

/// Build the ordered "why it fits" list for the best-fit case.
pub fn build_why_fits(
    best: &CaseResult,
    query: &CaseQuery,
    rule_token: &str,
    context: Option<&CommentaryContext>,
) -> Vec<String> {
    let mut bullets = Vec::new();

    // Lead sentence tying the court, year, rule, and the user's facts together
    let court = if best.court_label.is_empty() {
        "court"
    } else {
        best.court_label.as_str()
    };
    let mut summary = format!(
        "This {} decision from {} applies Rule {}",
        court, best.year, rule_token
    );
    if let Some(framing) = doctrinal_framing(rule_token) {
        summary.push(' ');
        summary.push_str(framing);
    }
    summary.push_str(" to a fact pattern similar to yours.");

    let concepts = fact_pattern_concepts(&query.fact_pattern);
    if !concepts.is_empty() {
        summary.push_str(&format!(
            " The case addresses {}, key elements that match your situation.",
            concepts.join(" and ")
        ));
    }
    bullets.push(summary);

    // Synthesis of the case's own snippets, in priority order
    let mut unique_snippets: Vec<&str> = Vec::new();
    for snippet in &best.snippets {
        if !unique_snippets.contains(&snippet.text.as_str()) {
            unique_snippets.push(&snippet.text);
        }
    }

    let mut snippet_parts = Vec::new();
    if let Some(first) = unique_snippets.first() {
        snippet_parts.push(format!("The court's application: \"{}\"", first));
    }
    if let Some(second) = unique_snippets.get(1) {
        snippet_parts.push(format!("Its reasoning: \"{}\"", second));
    }
    if let Some(third) = unique_snippets.get(2) {
        snippet_parts.push(format!("A limiting principle: \"{}\"", third));
    }
    if !snippet_parts.is_empty() {
        bullets.push(snippet_parts.join(" "));
    }

    // Cross-case doctrinal pattern, only when a phrase of quotable length
    // is available
    if let Some(context) = context {
        let common_pattern = context
            .phrases
            .iter()
            .find(|p| p.len() > CONTEXT_PHRASE_MIN && p.len() < CONTEXT_PHRASE_MAX);
        if let Some(pattern) = common_pattern {
            bullets.push(format!(
                "Courts commonly emphasize in similar opinions that {}",
                pattern
            ));
        }
    }

    bullets.truncate(MAX_ENTRIES);
    bullets
}
