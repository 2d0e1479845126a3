//! # Snippet Extraction Module
//!
//! ## Purpose
//! Selects and labels the most probative excerpts for each candidate case.
//!
//! ## Input/Output Specification
//! - **Input**: Provider highlights or full opinion text, plus the query
//! - **Output**: 1–3 labeled `Snippet`s; never an empty list
//! - **Strategies**: Highlight-driven (provider supplies query-guided
//!   excerpts) with a paragraph-scoring fallback over full text
//!
//! ## Error Condition
//! A failed or empty content fetch degrades to a single explanatory
//! placeholder snippet for that candidate only; extraction never fails the
//! batch.
//!
//! Paragraph and sentence boundaries are punctuation heuristics and
//! inherently lossy around abbreviations and citations; treat the output as
//! best-effort, not exact.

use crate::config::PipelineConfig;
use crate::providers::{ContentFetch, ContentRequest, HighlightSpec};
use crate::text_cleaning::TextCleaner;
use crate::utils::truncate_with_ellipsis;
use crate::{Candidate, CaseQuery, Snippet};
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// Sentences containing these phrases are favored as highlight sub-spans
const DISPOSITIVE_PHRASES: &[(&str, f64)] = &[
    ("we hold", 3.0),
    ("we conclude", 3.0),
    ("substantially outweigh", 2.0),
    ("abuse of discretion", 1.0),
];

/// Preferred sentence length bounds for a highlight sub-span
const SENTENCE_MIN_CHARS: usize = 40;
const SENTENCE_MAX_CHARS: usize = 280;

/// Selects and labels probative excerpts
pub struct SnippetExtractor {
    cleaner: Arc<TextCleaner>,
    config: PipelineConfig,
    paragraph_boundary: Regex,
}

impl SnippetExtractor {
    pub fn new(cleaner: Arc<TextCleaner>, config: PipelineConfig) -> Self {
        Self {
            cleaner,
            config,
            paragraph_boundary: Regex::new(r"\n\s*\n").expect("static pattern"),
        }
    }

    /// Extract snippets for one candidate via the content-fetch provider.
    /// Prefers provider highlights; falls back to paragraph scoring over
    /// full text, then to the candidate's own summary.
    pub async fn extract(
        &self,
        fetcher: &dyn ContentFetch,
        candidate: &Candidate,
        query: &CaseQuery,
        rule_token: &str,
    ) -> Vec<Snippet> {
        let highlight_query = format!(
            "Extract 1-2 sentences where the court applies Rule {} to facts like: {}. \
             Prefer application and reasoning; avoid rule recitations and procedural history.",
            rule_token, query.fact_pattern
        );

        let request = ContentRequest {
            urls: vec![candidate.url.clone()],
            return_full_text: false,
            highlights: Some(HighlightSpec {
                query: highlight_query,
                num_sentences: 2,
                highlights_per_url: self.config.max_snippets,
            }),
        };

        let contents = match fetcher.fetch_contents(request).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!("content fetch failed for '{}': {}", candidate.url, e);
                return vec![unable_to_extract_snippet()];
            }
        };

        let Some(doc) = contents.into_iter().next() else {
            return vec![unable_to_extract_snippet()];
        };

        if let Some(highlights) = doc.highlights.as_deref() {
            let from_highlights = self.from_highlights(highlights);
            if !from_highlights.is_empty() {
                return from_highlights;
            }
        }

        if let Some(text) = doc.text.as_deref() {
            let from_text = self.from_full_text(text, rule_token, &query.fact_pattern);
            if !from_text.is_empty() {
                return from_text;
            }
        }

        self.summary_fallback(candidate.summary_text.as_deref())
    }

    /// Highlight-driven strategy: clean each provider highlight, drop the
    /// tiny ones, label uniformly, cap at the configured maximum.
    pub fn from_highlights(&self, highlights: &[String]) -> Vec<Snippet> {
        highlights
            .iter()
            .map(|h| self.cleaner.clean(&h.replace("```", "")))
            .filter(|h| h.len() >= self.config.min_snippet_length)
            .take(self.config.max_snippets)
            .map(|text| Snippet {
                label: "Relevant excerpt".to_string(),
                highlight: Some(text.clone()),
                text,
            })
            .collect()
    }

    /// Fall back to the candidate's retrieval-time summary, and to an
    /// explicit placeholder when even that is too short. Never empty.
    pub fn summary_fallback(&self, summary: Option<&str>) -> Vec<Snippet> {
        let cleaned = summary
            .map(|s| self.cleaner.clean(&s.replace("```", "")))
            .unwrap_or_default();

        if cleaned.len() >= self.config.min_snippet_length {
            let text = truncate_with_ellipsis(&cleaned, self.config.summary_truncate_length);
            return vec![Snippet {
                label: "Key excerpt".to_string(),
                highlight: Some(text.clone()),
                text,
            }];
        }

        vec![no_excerpt_snippet()]
    }

    /// Paragraph-scoring strategy over full opinion text: pick the top
    /// paragraphs by keyword fit, then the best sentence within each as the
    /// highlight sub-span.
    pub fn from_full_text(&self, full_text: &str, rule_token: &str, fact_pattern: &str) -> Vec<Snippet> {
        let fact_keywords = fact_keywords(fact_pattern);

        let mut paragraphs: Vec<(String, f64)> = self
            .paragraph_boundary
            .split(full_text)
            .map(|p| self.cleaner.clean(p))
            .filter(|p| p.len() >= self.config.min_paragraph_length)
            .map(|p| {
                let score = paragraph_score(&p, rule_token, &fact_keywords);
                (p, score)
            })
            .collect();

        // Stable sort: equal scores keep document order
        paragraphs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        paragraphs
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .take(self.config.max_snippets)
            .map(|(paragraph, _)| {
                let highlight = self.best_sentence(&paragraph, rule_token);
                Snippet {
                    label: paragraph_label(&paragraph, rule_token).to_string(),
                    text: paragraph,
                    highlight,
                }
            })
            .collect()
    }

    /// Select the single most quotable sentence of a paragraph
    fn best_sentence(&self, paragraph: &str, rule_token: &str) -> Option<String> {
        let sentences = self.cleaner.split_sentences(paragraph);
        let mut best: Option<(&str, f64)> = None;

        for sentence in sentences {
            let lower = sentence.to_lowercase();
            let mut score = 0.0;

            for (phrase, weight) in DISPOSITIVE_PHRASES {
                if lower.contains(phrase) {
                    score += weight;
                }
            }
            if lower.contains(&rule_token.to_lowercase()) {
                score += 1.0;
            }
            let chars = sentence.chars().count();
            if (SENTENCE_MIN_CHARS..=SENTENCE_MAX_CHARS).contains(&chars) {
                score += 2.0;
            }

            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((sentence, score)),
            }
        }

        best.map(|(sentence, _)| sentence.to_string())
    }
}

/// Placeholder emitted when the content fetch yields nothing usable
pub fn unable_to_extract_snippet() -> Snippet {
    Snippet {
        label: "Summary".to_string(),
        text: "Unable to extract opinion text for this case.".to_string(),
        highlight: None,
    }
}

/// Placeholder emitted when even the retrieval summary is too short
pub fn no_excerpt_snippet() -> Snippet {
    Snippet {
        label: "Key excerpt".to_string(),
        text: "No excerpt available for this opinion.".to_string(),
        highlight: None,
    }
}

/// Distinct lowercase fact-pattern words long enough to carry signal
fn fact_keywords(fact_pattern: &str) -> Vec<String> {
    let mut keywords: Vec<String> = fact_pattern
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(String::from)
        .collect();
    keywords.sort();
    keywords.dedup();
    keywords
}

/// Score a paragraph by rule-token presence, probative/prejudice phrase
/// co-occurrence, and fact-pattern keyword overlap (capped)
fn paragraph_score(paragraph: &str, rule_token: &str, fact_keywords: &[String]) -> f64 {
    let lower = paragraph.to_lowercase();
    let mut score = 0.0;

    if lower.contains(&rule_token.to_lowercase()) {
        score += 3.0;
    }
    if lower.contains("probative") && lower.contains("prejudic") {
        score += 2.0;
    }
    if lower.contains("substantially outweigh") {
        score += 1.0;
    }

    let overlap = fact_keywords
        .iter()
        .filter(|k| lower.contains(k.as_str()))
        .count()
        .min(3);
    score += overlap as f64;

    score
}

/// Semantic label for a chosen paragraph
fn paragraph_label(paragraph: &str, rule_token: &str) -> &'static str {
    let lower = paragraph.to_lowercase();

    let states_rule = lower.contains(&rule_token.to_lowercase());
    if states_rule && (lower.contains("test") || lower.contains("standard") || lower.contains("governs")) {
        return "The test";
    }
    if lower.contains("admitted")
        || lower.contains("excluded")
        || lower.contains("admissible")
        || lower.contains("inadmissible")
    {
        return "Why admitted/excluded";
    }
    if lower.contains("limit") || lower.contains("narrow") || lower.contains("caution") {
        return "Limiting principle";
    }
    "Key paragraph"
}
