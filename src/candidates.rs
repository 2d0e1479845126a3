//! # Candidate Normalization Module
//!
//! ## Purpose
//! Converts raw provider results into uniform `Candidate` records and
//! collapses duplicates referring to the same source document.
//!
//! ## Input/Output Specification
//! - **Input**: `DocumentHit`s from the semantic provider, `OpinionHit`s from
//!   the case-law provider
//! - **Output**: Best-effort `Candidate` records; missing or ambiguous fields
//!   degrade to defaults rather than raising errors
//!
//! Normalization never fails. The year parse attempts, in order: an explicit
//! date field, the first 19xx/20xx token in the title or summary, then the
//! current year.

use crate::providers::{DocumentHit, OpinionHit};
use crate::utils::collapse_whitespace;
use crate::{Candidate, CandidateSource};
use regex::Regex;

/// Display name used when a provider returned no title
const UNKNOWN_CASE: &str = "Unknown case";

/// Converts provider hits into `Candidate` records
pub struct CandidateNormalizer {
    year_pattern: Regex,
    /// URL path marker identifying opinion pages on the semantic provider
    opinion_path_marker: String,
}

impl CandidateNormalizer {
    pub fn new(opinion_path_marker: &str) -> Self {
        Self {
            // Publication years of interest are all 19xx/20xx
            year_pattern: Regex::new(r"(19|20)\d{2}").expect("static pattern"),
            opinion_path_marker: opinion_path_marker.to_string(),
        }
    }

    /// Normalize a semantic-provider hit. Returns `None` for hits that are
    /// not opinion pages (index pages, dockets) or carry no title.
    pub fn from_document_hit(&self, hit: &DocumentHit, now_year: i32) -> Option<Candidate> {
        let title = hit.title.as_deref()?;
        if !hit.url.contains(&self.opinion_path_marker) {
            return None;
        }

        let highlight_text = hit
            .highlights
            .as_ref()
            .map(|hs| hs.join(" "))
            .filter(|joined| !joined.is_empty());
        let summary_text = highlight_text.clone().or_else(|| hit.text.clone());

        let year = highlight_text
            .as_deref()
            .and_then(|text| self.year_from_text(text))
            .or_else(|| self.year_from_text(title))
            .unwrap_or(now_year);

        Some(Candidate {
            id: format!("sem-{}", hit.id),
            name: normalize_case_name(Some(title)),
            court_id: None,
            court_label: "CourtListener".to_string(),
            year,
            url: hit.url.clone(),
            source: CandidateSource::Semantic,
            summary_text,
        })
    }

    /// Normalize a case-law-provider hit. Always produces a record.
    pub fn from_opinion_hit(&self, hit: &OpinionHit, now_year: i32) -> Candidate {
        let year = hit
            .date_filed
            .as_deref()
            .and_then(year_from_date)
            .or_else(|| hit.case_name.as_deref().and_then(|n| self.year_from_text(n)))
            .unwrap_or(now_year);

        let court_label = hit
            .court
            .clone()
            .unwrap_or_else(|| "CourtListener".to_string());

        Candidate {
            id: format!("cl-{}", hit.id),
            name: normalize_case_name(hit.case_name.as_deref()),
            court_id: hit.court.clone(),
            court_label,
            year,
            url: hit.absolute_url.clone(),
            source: CandidateSource::CaseLaw,
            summary_text: None,
        }
    }

    /// First 19xx/20xx token in free text
    fn year_from_text(&self, text: &str) -> Option<i32> {
        self.year_pattern
            .find(text)
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Extract the year from an ISO date prefix (e.g. "2018-03-15" -> 2018)
fn year_from_date(date: &str) -> Option<i32> {
    if date.len() < 4 {
        return None;
    }
    date[..4].parse().ok()
}

/// Collapse whitespace in a case name, defaulting when absent
fn normalize_case_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => collapse_whitespace(name),
        _ => UNKNOWN_CASE.to_string(),
    }
}

/// Collapse candidates whose normalized URL (case-insensitive) collide,
/// keeping the first occurrence. Order of survivors matches their order of
/// first appearance, preserving the upstream ranking signal.
pub fn dedupe_by_url(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> CandidateNormalizer {
        CandidateNormalizer::new("/opinion/")
    }

    fn doc_hit(id: &str, url: &str, title: Option<&str>) -> DocumentHit {
        DocumentHit {
            id: id.to_string(),
            url: url.to_string(),
            title: title.map(String::from),
            text: None,
            highlights: None,
        }
    }

    #[test]
    fn drops_non_opinion_urls_and_untitled_hits() {
        let n = normalizer();
        assert!(n
            .from_document_hit(&doc_hit("1", "https://x.com/docket/5/", Some("A v. B")), 2026)
            .is_none());
        assert!(n
            .from_document_hit(&doc_hit("2", "https://x.com/opinion/5/", None), 2026)
            .is_none());
        assert!(n
            .from_document_hit(&doc_hit("3", "https://x.com/opinion/5/", Some("A v. B")), 2026)
            .is_some());
    }

    #[test]
    fn year_from_highlights_preferred_over_title() {
        let n = normalizer();
        let mut hit = doc_hit("1", "https://x.com/opinion/5/", Some("A v. B (2001)"));
        hit.highlights = Some(vec!["decided in 2018 on remand".to_string()]);
        let candidate = n.from_document_hit(&hit, 2026).unwrap();
        assert_eq!(candidate.year, 2018);
    }

    #[test]
    fn year_falls_back_to_title_then_current_year() {
        let n = normalizer();
        let candidate = n
            .from_document_hit(&doc_hit("1", "https://x.com/opinion/5/", Some("A v. B (2001)")), 2026)
            .unwrap();
        assert_eq!(candidate.year, 2001);

        let candidate = n
            .from_document_hit(&doc_hit("2", "https://x.com/opinion/6/", Some("A v. B")), 2026)
            .unwrap();
        assert_eq!(candidate.year, 2026);
    }

    #[test]
    fn opinion_hit_year_from_date_filed() {
        let n = normalizer();
        let hit = OpinionHit {
            id: "99".to_string(),
            case_name: Some("United  States v.   X".to_string()),
            date_filed: Some("2014-06-02".to_string()),
            court: Some("cand".to_string()),
            absolute_url: "https://x.com/opinion/99/".to_string(),
        };
        let candidate = n.from_opinion_hit(&hit, 2026);
        assert_eq!(candidate.year, 2014);
        assert_eq!(candidate.name, "United States v. X");
        assert_eq!(candidate.court_id.as_deref(), Some("cand"));
    }

    #[test]
    fn opinion_hit_defaults_when_fields_missing() {
        let n = normalizer();
        let hit = OpinionHit {
            id: "7".to_string(),
            case_name: None,
            date_filed: None,
            court: None,
            absolute_url: "https://x.com/opinion/7/".to_string(),
        };
        let candidate = n.from_opinion_hit(&hit, 2026);
        assert_eq!(candidate.name, "Unknown case");
        assert_eq!(candidate.year, 2026);
    }

    fn candidate(url: &str) -> Candidate {
        Candidate {
            id: url.to_string(),
            name: "case".to_string(),
            court_id: None,
            court_label: "c".to_string(),
            year: 2020,
            url: url.to_string(),
            source: CandidateSource::Semantic,
            summary_text: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let input = vec![
            candidate("https://x.com/opinion/1/"),
            candidate("https://x.com/opinion/2/"),
            candidate("HTTPS://X.COM/OPINION/1/"),
            candidate("https://x.com/opinion/3/"),
            candidate("https://x.com/opinion/2/"),
        ];
        let deduped = dedupe_by_url(input);
        let urls: Vec<_> = deduped.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.com/opinion/1/",
                "https://x.com/opinion/2/",
                "https://x.com/opinion/3/",
            ]
        );
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            candidate("https://x.com/opinion/1/"),
            candidate("https://x.com/opinion/1/"),
            candidate("https://x.com/opinion/2/"),
        ];
        let once = dedupe_by_url(input);
        let twice = dedupe_by_url(once.clone());
        assert_eq!(
            once.iter().map(|c| &c.url).collect::<Vec<_>>(),
            twice.iter().map(|c| &c.url).collect::<Vec<_>>()
        );
    }
}
