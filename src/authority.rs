//! # Authority Classification Module
//!
//! ## Purpose
//! Assigns a precedential-weight category to a candidate given the query's
//! jurisdiction. Pure function; unknown or missing jurisdictions fall
//! through to the age-based rules.

use crate::{Authority, Candidate, CaseQuery};

/// Court identifiers ending in this marker denote trial-level (district)
/// courts under the case-law repository's naming convention.
const DISTRICT_MARKER: char = 'd';

/// Cases older than this many years are categorized separately
const OLDER_THRESHOLD_YEARS: i32 = 20;

/// Classify a candidate's precedential weight. Rules apply in order:
/// jurisdiction match, district-court marker, age, then persuasive.
pub fn classify(candidate: &Candidate, query: &CaseQuery, now_year: i32) -> Authority {
    if candidate.court_id.as_deref() == Some(query.court_id.as_str()) {
        return Authority::Binding;
    }

    if let Some(court_id) = &candidate.court_id {
        if court_id.ends_with(DISTRICT_MARKER) {
            return Authority::District;
        }
    }

    if now_year - candidate.year > OLDER_THRESHOLD_YEARS {
        return Authority::Older;
    }

    Authority::Persuasive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CandidateSource;

    fn query() -> CaseQuery {
        CaseQuery {
            rule: "403".to_string(),
            court_id: "ca9".to_string(),
            fact_pattern: "graphic photos".to_string(),
            prefer_binding: false,
            include_persuasive: true,
            only_published: false,
            time_window_years: 10,
        }
    }

    fn candidate(court_id: Option<&str>, year: i32) -> Candidate {
        Candidate {
            id: "c".to_string(),
            name: "A v. B".to_string(),
            court_id: court_id.map(String::from),
            court_label: "Court".to_string(),
            year,
            url: "https://x.com/opinion/1/".to_string(),
            source: CandidateSource::CaseLaw,
            summary_text: None,
        }
    }

    #[test]
    fn matching_court_is_binding() {
        assert_eq!(classify(&candidate(Some("ca9"), 1980), &query(), 2026), Authority::Binding);
    }

    #[test]
    fn district_marker_beats_age() {
        assert_eq!(classify(&candidate(Some("cand"), 1980), &query(), 2026), Authority::District);
    }

    #[test]
    fn old_cases_without_court_are_older() {
        assert_eq!(classify(&candidate(None, 2005), &query(), 2026), Authority::Older);
    }

    #[test]
    fn age_boundary_is_exclusive() {
        // Exactly 20 years old stays persuasive
        assert_eq!(classify(&candidate(None, 2006), &query(), 2026), Authority::Persuasive);
        assert_eq!(classify(&candidate(Some("ca2"), 2020), &query(), 2026), Authority::Persuasive);
    }
}
