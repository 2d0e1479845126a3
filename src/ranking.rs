//! # Relevance Ranking Module
//!
//! ## Purpose
//! Orders candidates by fit to the query when provider order alone is not
//! trustworthy, accumulating independently weighted contributions: keyword
//! overlap, jurisdiction match, recency, and publication status.
//!
//! ## Input/Output Specification
//! - **Input**: Deduplicated, time-filtered candidates plus the query
//! - **Output**: The same candidates in ranking order (the ranking signal of
//!   record); no candidate is invented or modified
//! - **Stability**: Ties preserve original input order
//!
//! The weights are injected via `RankingConfig` so ranking can be tuned and
//! tested without touching this logic. `RankingMode::ProviderOrder` bypasses
//! scoring entirely and trusts the order the providers returned.

use crate::authority;
use crate::config::{RankingConfig, RankingMode};
use crate::{Authority, Candidate, CaseQuery};
use tracing::debug;

/// Scores and orders candidates
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Order candidates by fit. In `ProviderOrder` mode the incoming order
    /// is returned untouched.
    pub fn rank(
        &self,
        candidates: Vec<Candidate>,
        query: &CaseQuery,
        rule_token: &str,
        now_year: i32,
    ) -> Vec<Candidate> {
        if self.config.mode == RankingMode::ProviderOrder {
            return candidates;
        }

        let mut scored: Vec<(Candidate, f64)> = candidates
            .into_iter()
            .map(|c| {
                let score = self.score(&c, query, rule_token, now_year);
                (c, score)
            })
            .collect();

        // Stable sort: equal scores keep their incoming relative order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (candidate, score) in &scored {
            debug!("ranked candidate '{}' at {:.2}", candidate.name, score);
        }

        let ordered: Vec<Candidate> = scored.into_iter().map(|(c, _)| c).collect();

        if query.prefer_binding {
            self.pin_binding(ordered, query, now_year)
        } else {
            ordered
        }
    }

    /// Accumulate the weighted score for one candidate
    fn score(&self, candidate: &Candidate, query: &CaseQuery, rule_token: &str, now_year: i32) -> f64 {
        let text = candidate.scoring_text().to_lowercase();
        let fact = query.fact_pattern.to_lowercase();
        let mut score = 0.0;

        if text.contains(&rule_token.to_lowercase()) {
            score += self.config.rule_match;
        }
        if self.config.domain_phrases.iter().any(|p| text.contains(p.as_str())) {
            score += self.config.domain_phrase;
        }

        if candidate.court_id.as_deref() == Some(query.court_id.as_str()) {
            score += self.config.jurisdiction_match;
            if query.prefer_binding {
                score += self.config.prefer_binding_boost;
            }
        }

        let age = now_year - candidate.year;
        if age <= query.time_window_years as i32 {
            // Flat recency bonus plus a decay favoring newer cases
            score += self.config.within_window;
            score += 2.0 / (1.0 + age.max(0) as f64);
        } else {
            score += self.config.outside_window;
        }

        if query.only_published && candidate.source == crate::CandidateSource::CaseLaw {
            score += self.config.published_bonus;
        }

        // Paired keywords count only on co-occurrence in both the candidate
        // text and the fact pattern
        for keyword in &self.config.keyword_weights {
            let term = keyword.term.to_lowercase();
            if text.contains(&term) && fact.contains(&term) {
                score += keyword.weight;
            }
        }

        score
    }

    /// Pin the highest-ranked binding candidate to position 0, then append
    /// the remainder in score order, skipping persuasive-authority
    /// candidates when the query excludes them.
    fn pin_binding(&self, ordered: Vec<Candidate>, query: &CaseQuery, now_year: i32) -> Vec<Candidate> {
        let pin_index = ordered
            .iter()
            .position(|c| authority::classify(c, query, now_year) == Authority::Binding);

        let Some(pin_index) = pin_index else {
            return ordered;
        };

        let mut result = Vec::with_capacity(ordered.len());
        let mut rest = Vec::new();
        for (index, candidate) in ordered.into_iter().enumerate() {
            if index == pin_index {
                result.push(candidate);
            } else {
                rest.push(candidate);
            }
        }

        for candidate in rest {
            if !query.include_persuasive
                && authority::classify(&candidate, query, now_year) == Authority::Persuasive
            {
                continue;
            }
            result.push(candidate);
        }

        result
    }
}
