//! # Text Cleaning Module
//!
//! ## Purpose
//! Strips navigational chrome, editorial markers, and other boilerplate from
//! raw extracted opinion text so that only legal prose reaches snippet
//! selection and display.
//!
//! ## Input/Output Specification
//! - **Input**: Raw extracted text (may contain site navigation, editorial
//!   markers, empty lines)
//! - **Output**: A single normalized string with boilerplate removed and
//!   whitespace collapsed
//! - **Idempotence**: Cleaning already-clean text returns it unchanged
//!
//! The pattern set is configuration, not code: repositories with different
//! page chrome can be accommodated without touching this module.

use crate::config::CleaningConfig;
use crate::errors::Result;
use crate::utils::collapse_whitespace;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Compiled boilerplate-removal rules
pub struct TextCleaner {
    inline_patterns: Vec<Regex>,
    drop_line_patterns: Vec<Regex>,
    sentence_boundary: Regex,
}

impl TextCleaner {
    /// Compile a cleaner from configuration. Invalid patterns fail here,
    /// once, rather than on the first query.
    pub fn new(config: &CleaningConfig) -> Result<Self> {
        let inline_patterns = config
            .inline_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let drop_line_patterns = config
            .drop_line_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let sentence_boundary = Regex::new(&config.sentence_boundary_pattern)?;

        Ok(Self {
            inline_patterns,
            drop_line_patterns,
            sentence_boundary,
        })
    }

    /// Remove boilerplate and normalize whitespace.
    pub fn clean(&self, raw: &str) -> String {
        let mut text: String = raw.nfc().collect();

        // Inline markers are embedded mid-line; strip them before the
        // line-level pass sees the text
        for pattern in &self.inline_patterns {
            text = pattern.replace_all(&text, "").to_string();
        }

        let kept: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !self.drop_line_patterns.iter().any(|p| p.is_match(line)))
            .collect();

        collapse_whitespace(&kept.join(" "))
    }

    /// Split text into sentences using the configured boundary expression.
    /// Best-effort: abbreviations and citations with periods will over-split.
    pub fn split_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.sentence_boundary
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> TextCleaner {
        TextCleaner::new(&CleaningConfig::default()).unwrap()
    }

    #[test]
    fn removes_editorial_markers() {
        let cleaned = cleaner().clean("The court held ( edit ) that the evidence (none) was cumulative.");
        assert_eq!(cleaned, "The court held that the evidence was cumulative.");
    }

    #[test]
    fn removes_navigation_sections() {
        let raw = "### Your Notes ( edit ) (none) ### Summaries (9)\nWe conclude the photographs were admissible.";
        let cleaned = cleaner().clean(raw);
        assert_eq!(cleaned, "We conclude the photographs were admissible.");
    }

    #[test]
    fn drops_navigation_lines() {
        let raw = "Skip to main content\n[Search Cornell]\nCornell Law School\nRule 403 permits exclusion of relevant evidence.";
        let cleaned = cleaner().clean(raw);
        assert_eq!(cleaned, "Rule 403 permits exclusion of relevant evidence.");
    }

    #[test]
    fn collapses_whitespace_and_empty_lines() {
        let cleaned = cleaner().clean("The  test \n\n applies   here.\n");
        assert_eq!(cleaned, "The test applies here.");
    }

    #[test]
    fn clean_is_idempotent() {
        let c = cleaner();
        let inputs = [
            "### Your Notes ( edit ) (none) ### Summaries (3)\nplain text survives",
            "Skip to main content\nactual   opinion\ttext",
            "already clean text.",
            "",
        ];
        for input in inputs {
            let once = c.clean(input);
            assert_eq!(c.clean(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn splits_sentences() {
        let c = cleaner();
        let sentences = c.split_sentences("We hold the evidence inadmissible. The judgment is reversed! Remand follows.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[1], "The judgment is reversed");
    }
}
