//! # Rule Token Module
//!
//! ## Purpose
//! Normalizes free-text rule identifiers into canonical tokens and derives
//! the doctrinal framing and issue tags used throughout the pipeline.
//!
//! ## Input/Output Specification
//! - **Input**: User-entered rule text ("FRE 403"), fact patterns, case names
//! - **Output**: Canonical rule tokens ("403"), framing phrases, issue tags

use crate::{CaseQuery, Candidate};

/// Normalize rule input to a canonical token (e.g. "FRE 403" -> "403").
/// Unrecognized rules pass through unchanged so downstream labels still
/// read sensibly.
pub fn normalize_rule_token(rule: &str) -> String {
    let lower = rule.to_lowercase();
    for token in ["403", "404", "401", "402", "702"] {
        if lower.contains(token) {
            return token.to_string();
        }
    }
    if lower.contains("801") || lower.contains("807") || lower.contains("hearsay") {
        return "801".to_string();
    }
    rule.to_string()
}

/// Doctrinal framing appended to the lead explanation sentence for known
/// rule tokens.
pub fn doctrinal_framing(rule_token: &str) -> Option<&'static str> {
    match rule_token {
        "403" => Some("by balancing probative value against unfair prejudice"),
        "404" => Some("regarding character evidence and prior bad acts"),
        "702" => Some("in evaluating expert testimony and scientific evidence"),
        "801" => Some("in determining hearsay admissibility"),
        _ => None,
    }
}

/// Recognized fact-pattern concepts, as (matched keywords, concept phrase)
/// pairs. Used for both the explanation clause and issue tagging.
const FACT_CONCEPTS: &[(&[&str], &str, &str)] = &[
    (&["photo", "graphic"], "graphic or disturbing images", "graphic photos"),
    (&["stipulation", "stipulated"], "offered stipulations", "stipulation"),
    (&["expert"], "expert testimony", "expert testimony"),
    (&["hearsay"], "hearsay statements", "hearsay"),
];

/// Concept phrases for fact-pattern keywords found in the query, in table
/// order. Feeds the explanation builder.
pub fn fact_pattern_concepts(fact_pattern: &str) -> Vec<&'static str> {
    let fact_lower = fact_pattern.to_lowercase();
    FACT_CONCEPTS
        .iter()
        .filter(|(keywords, _, _)| keywords.iter().any(|k| fact_lower.contains(k)))
        .map(|(_, concept, _)| *concept)
        .collect()
}

/// Issue tags for a case: the rule number always, plus keyword-derived
/// labels from the fact pattern and the case name.
pub fn issue_tags(query: &CaseQuery, candidate: &Candidate, rule_token: &str) -> Vec<String> {
    let mut tags = vec![format!("Rule {}", rule_token)];
    let fact_lower = query.fact_pattern.to_lowercase();

    for (keywords, _, tag) in FACT_CONCEPTS {
        if keywords.iter().any(|k| fact_lower.contains(k)) {
            tags.push((*tag).to_string());
        }
    }

    let name_lower = candidate.name.to_lowercase();
    if name_lower.contains("unfair prejudice") || fact_lower.contains("prejudice") {
        tags.push("unfair prejudice".to_string());
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CandidateSource;

    fn query(fact_pattern: &str) -> CaseQuery {
        CaseQuery {
            rule: "FRE 403".to_string(),
            court_id: "ca9".to_string(),
            fact_pattern: fact_pattern.to_string(),
            prefer_binding: false,
            include_persuasive: true,
            only_published: false,
            time_window_years: 10,
        }
    }

    fn candidate(name: &str) -> Candidate {
        Candidate {
            id: "c1".to_string(),
            name: name.to_string(),
            court_id: None,
            court_label: "Court".to_string(),
            year: 2020,
            url: "https://example.com/opinion/1".to_string(),
            source: CandidateSource::Semantic,
            summary_text: None,
        }
    }

    #[test]
    fn normalizes_known_rules() {
        assert_eq!(normalize_rule_token("FRE 403"), "403");
        assert_eq!(normalize_rule_token("Rule 702 (Daubert)"), "702");
        assert_eq!(normalize_rule_token("hearsay exception"), "801");
        assert_eq!(normalize_rule_token("807"), "801");
    }

    #[test]
    fn unknown_rule_passes_through() {
        assert_eq!(normalize_rule_token("Rule 609"), "Rule 609");
    }

    #[test]
    fn tags_always_include_rule() {
        let tags = issue_tags(&query("a dull dispute"), &candidate("A v. B"), "403");
        assert_eq!(tags, vec!["Rule 403"]);
    }

    #[test]
    fn tags_derived_from_fact_pattern_and_name() {
        let tags = issue_tags(
            &query("graphic photos offered; a stipulation was refused"),
            &candidate("State v. Unfair Prejudice"),
            "403",
        );
        assert!(tags.contains(&"graphic photos".to_string()));
        assert!(tags.contains(&"stipulation".to_string()));
        assert!(tags.contains(&"unfair prejudice".to_string()));
    }

    #[test]
    fn concepts_follow_table_order() {
        let concepts = fact_pattern_concepts("hearsay through an expert about photos");
        assert_eq!(
            concepts,
            vec!["graphic or disturbing images", "expert testimony", "hearsay statements"]
        );
    }
}
