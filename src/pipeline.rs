//! # Pipeline Orchestration Module
//!
//! ## Purpose
//! Sequences one query end to end: query providers → normalize/deduplicate →
//! empty-check → time-filter → rank/truncate → enrich per candidate →
//! explain → assemble results.
//!
//! ## Input/Output Specification
//! - **Input**: One validated `CaseQuery`
//! - **Output**: One `SearchResults`; the empty-result case is a defined
//!   payload, not an error
//! - **Degradation**: A failed or empty provider response yields fewer or no
//!   candidates for that provider and propagates naturally; providers are
//!   never retried
//!
//! ## Concurrency
//! The provider fan-out runs concurrently and joins before normalization.
//! Per-candidate enrichment runs concurrently under a per-candidate budget;
//! the final ordered list is reassembled deterministically in rank order.
//! Each invocation owns its entire candidate graph; nothing is shared or
//! cached across queries.

use crate::authority;
use crate::candidates::{dedupe_by_url, CandidateNormalizer};
use crate::config::{Config, PipelineConfig, ProvidersConfig};
use crate::errors::Result;
use crate::explain::{build_why_fits, CommentaryContext};
use crate::providers::{
    CaseLawClient, ContentFetch, DocumentHit, DocumentSearch, HighlightSpec, OpinionHit,
    OpinionQuery, OpinionSearch, SearchRequest, SemanticSearchClient,
};
use crate::providers::caselaw::iso_date_years_ago;
use crate::ranking::Ranker;
use crate::rules::{issue_tags, normalize_rule_token};
use crate::snippets::{unable_to_extract_snippet, SnippetExtractor};
use crate::text_cleaning::TextCleaner;
use crate::utils::{collapse_whitespace, Timer};
use crate::{
    Authority, Candidate, CaseQuery, CaseResult, RuleExplainer, SearchDebug, SearchResults,
    Snippet,
};
use chrono::{Datelike, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Minimum length for a commentary phrase worth carrying forward
const COMMENTARY_PHRASE_MIN: usize = 40;

/// End-to-end search pipeline over injected provider implementations
pub struct SearchPipeline {
    document_search: Arc<dyn DocumentSearch>,
    content_fetch: Arc<dyn ContentFetch>,
    opinion_search: Arc<dyn OpinionSearch>,
    normalizer: CandidateNormalizer,
    ranker: Ranker,
    extractor: SnippetExtractor,
    cleaner: Arc<TextCleaner>,
    providers: ProvidersConfig,
    pipeline: PipelineConfig,
    debug_responses: bool,
}

impl SearchPipeline {
    /// Build a pipeline over explicit provider implementations. Tests use
    /// this seam to substitute stubs.
    pub fn new(
        document_search: Arc<dyn DocumentSearch>,
        content_fetch: Arc<dyn ContentFetch>,
        opinion_search: Arc<dyn OpinionSearch>,
        config: &Config,
    ) -> Result<Self> {
        let cleaner = Arc::new(TextCleaner::new(&config.cleaning)?);
        Ok(Self {
            document_search,
            content_fetch,
            opinion_search,
            normalizer: CandidateNormalizer::new(&config.providers.semantic.opinion_path_marker),
            ranker: Ranker::new(config.ranking.clone()),
            extractor: SnippetExtractor::new(cleaner.clone(), config.pipeline.clone()),
            cleaner,
            providers: config.providers.clone(),
            pipeline: config.pipeline.clone(),
            debug_responses: config.server.debug_responses,
        })
    }

    /// Build a pipeline backed by the real HTTP provider clients
    pub fn from_config(config: &Config) -> Result<Self> {
        let semantic = Arc::new(SemanticSearchClient::new(config.providers.semantic.clone())?);
        let caselaw = Arc::new(CaseLawClient::new(config.providers.caselaw.clone())?);
        Self::new(semantic.clone(), semantic, caselaw, config)
    }

    /// Execute one query. Provider and extraction failures are absorbed into
    /// degraded output; the empty-result case is a normal value.
    pub async fn run(&self, query: &CaseQuery) -> Result<SearchResults> {
        let timer = Timer::new("search-pipeline");
        let rule_token = normalize_rule_token(&query.rule);
        let now_year = Utc::now().year();

        info!(
            "pipeline start: rule '{}', court '{}', window {}y",
            rule_token, query.court_id, query.time_window_years
        );

        // Stage 1: provider fan-out
        let (doc_hits, commentary_hits, rule_hits, opinion_hits) =
            self.query_providers(query, &rule_token).await;

        // Stage 2: normalize and deduplicate, preserving provider rank order
        let mut candidates: Vec<Candidate> = doc_hits
            .iter()
            .filter_map(|hit| self.normalizer.from_document_hit(hit, now_year))
            .collect();
        candidates.extend(
            opinion_hits
                .iter()
                .map(|hit| self.normalizer.from_opinion_hit(hit, now_year)),
        );

        let provider_count = candidates.len();
        let merged = dedupe_by_url(candidates);
        let merged_count = merged.len();
        debug!("candidates: {} retrieved, {} after dedup", provider_count, merged_count);

        let debug_info = self.debug_responses.then_some(SearchDebug {
            provider_count,
            merged_count,
        });

        let commentary = self.commentary_context(&commentary_hits);
        let rule_explainer = self.rule_explainer(&rule_hits, query);

        // Stage 3: empty-check short-circuits all later stages
        if merged.is_empty() {
            info!("no candidates survived retrieval; returning fallback payload");
            timer.stop();
            return Ok(no_results_payload(&rule_token, now_year, debug_info));
        }

        // Stage 4: drop candidates outside the time window; cases at exactly
        // the boundary are retained
        let filtered: Vec<Candidate> = merged
            .into_iter()
            .filter(|c| now_year - c.year <= query.time_window_years as i32)
            .collect();

        if filtered.is_empty() {
            info!("time window excluded every candidate; returning fallback payload");
            timer.stop();
            return Ok(no_results_payload(&rule_token, now_year, debug_info));
        }

        // Stage 5: rank and truncate
        let ranked = self.ranker.rank(filtered, query, &rule_token, now_year);
        let top: Vec<Candidate> = ranked.into_iter().take(self.pipeline.top_n).collect();

        // Stage 6: enrich concurrently; reassembly preserves rank order
        let enrichments = top
            .iter()
            .map(|candidate| self.enrich(candidate, query, &rule_token, now_year));
        let cases: Vec<CaseResult> = join_all(enrichments).await;

        // Stage 7: the first enriched result is the best fit
        let best_fit = cases[0].clone();
        let why_fits = build_why_fits(&best_fit, query, &rule_token, commentary.as_ref());

        timer.stop();
        Ok(SearchResults {
            best_fit,
            cases,
            why_fits,
            rule_explainer,
            debug: debug_info,
        })
    }

    /// Issue the provider calls concurrently. Each failure degrades to an
    /// empty contribution without aborting the others.
    async fn query_providers(
        &self,
        query: &CaseQuery,
        rule_token: &str,
    ) -> (
        Vec<DocumentHit>,
        Vec<DocumentHit>,
        Vec<DocumentHit>,
        Vec<OpinionHit>,
    ) {
        let base_query = format!(
            "Find judicial opinions that apply Rule {} to a fact pattern like this: {}. \
             Prefer opinions analyzing admissibility and explaining the court's reasoning.",
            rule_token, query.fact_pattern
        );
        let highlight_query = format!(
            "Extract the passage where the court applies Rule {} to facts like: {}. \
             Prefer the court's reasoning and what evidence was admitted or excluded and why.",
            rule_token, query.fact_pattern
        );
        let commentary_query = format!(
            "Across similar fact patterns ({}), summarize how courts typically apply Rule {}. \
             Extract recurring factors and common reasoning used to admit or exclude evidence.",
            query.fact_pattern, rule_token
        );
        let rule_query = format!(
            "Rule {}: provide the rule text and a short explanation of the test and elements.",
            rule_token
        );

        let caselaw_request = SearchRequest {
            query: base_query,
            num_results: self.providers.semantic.caselaw_num_results,
            include_domains: vec![self.providers.semantic.caselaw_domain.clone()],
            exclude_domains: Vec::new(),
            return_full_text: false,
            highlights: Some(HighlightSpec {
                query: highlight_query,
                num_sentences: 2,
                highlights_per_url: 1,
            }),
        };
        let commentary_request = SearchRequest {
            query: commentary_query.clone(),
            num_results: self.providers.semantic.commentary_num_results,
            include_domains: vec![self.providers.semantic.commentary_domain.clone()],
            exclude_domains: Vec::new(),
            return_full_text: false,
            highlights: Some(HighlightSpec {
                query: commentary_query,
                num_sentences: 2,
                highlights_per_url: 1,
            }),
        };
        let rule_request = SearchRequest {
            query: rule_query.clone(),
            num_results: 1,
            include_domains: vec![self.providers.semantic.rule_text_domain.clone()],
            exclude_domains: Vec::new(),
            return_full_text: false,
            highlights: Some(HighlightSpec {
                query: rule_query,
                num_sentences: 2,
                highlights_per_url: 1,
            }),
        };
        let opinion_query = OpinionQuery {
            query: format!("Rule {} {}", rule_token, query.fact_pattern),
            court_id: (!query.court_id.is_empty()).then(|| query.court_id.clone()),
            date_min: Some(iso_date_years_ago(query.time_window_years)),
            only_published: query.only_published,
            page_size: self.providers.caselaw.page_size,
        };

        let (caselaw, commentary, rule_text, opinions) = tokio::join!(
            self.document_search.search(caselaw_request),
            self.document_search.search(commentary_request),
            self.document_search.search(rule_request),
            self.opinion_search.search_opinions(opinion_query),
        );

        (
            absorb("case-law document search", caselaw),
            absorb("commentary search", commentary),
            absorb("rule-text search", rule_text),
            absorb("opinion search", opinions),
        )
    }

    /// Classify, tag, and annotate one candidate with snippets. The snippet
    /// fetch runs under a budget; an elapsed budget degrades to the
    /// placeholder snippet instead of failing the batch.
    async fn enrich(
        &self,
        candidate: &Candidate,
        query: &CaseQuery,
        rule_token: &str,
        now_year: i32,
    ) -> CaseResult {
        let authority = authority::classify(candidate, query, now_year);
        let tags = issue_tags(query, candidate, rule_token);

        let budget = Duration::from_millis(self.pipeline.enrichment_timeout_ms);
        let snippets = match tokio::time::timeout(
            budget,
            self.extractor
                .extract(self.content_fetch.as_ref(), candidate, query, rule_token),
        )
        .await
        {
            Ok(snippets) => snippets,
            Err(_) => {
                warn!("enrichment budget exceeded for '{}'", candidate.url);
                vec![unable_to_extract_snippet()]
            }
        };

        CaseResult {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            court_label: candidate.court_label.clone(),
            year: candidate.year,
            authority,
            issue_tags: tags,
            url: Some(candidate.url.clone()),
            snippets,
        }
    }

    /// Extract doctrinal phrases from the commentary hits. The commentary
    /// source never contributes cases, only explanation context.
    fn commentary_context(&self, hits: &[DocumentHit]) -> Option<CommentaryContext> {
        let mut phrases = Vec::new();
        for hit in hits {
            let text = match (&hit.text, &hit.highlights) {
                (Some(text), _) => text.clone(),
                (None, Some(highlights)) => highlights.join(" "),
                (None, None) => continue,
            };
            let cleaned = self.cleaner.clean(&text);
            if let Some(first) = self.cleaner.split_sentences(&cleaned).first() {
                if first.len() > COMMENTARY_PHRASE_MIN {
                    phrases.push((*first).to_string());
                }
            }
        }

        if phrases.is_empty() {
            None
        } else {
            Some(CommentaryContext { phrases })
        }
    }

    /// Build the rule-explainer card from the rule-text search, when the
    /// provider returned anything quotable.
    fn rule_explainer(&self, hits: &[DocumentHit], query: &CaseQuery) -> Option<RuleExplainer> {
        let first = hits.first()?;
        let title = first
            .title
            .clone()
            .unwrap_or_else(|| format!("{} - Federal Rules of Evidence", query.rule));
        let text = collapse_whitespace(&first.highlights.as_deref().unwrap_or_default().join(" "));

        if text.is_empty() {
            None
        } else {
            Some(RuleExplainer { title, text })
        }
    }
}

/// Unwrap a provider response, degrading failures to an empty contribution
fn absorb<T>(provider: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!("{} degraded to empty: {}", provider, e);
            Vec::new()
        }
    }
}

/// The fixed payload for queries where no candidate survived retrieval or
/// filtering. A normal value, deliberately distinct from a hard error.
fn no_results_payload(rule_token: &str, now_year: i32, debug: Option<SearchDebug>) -> SearchResults {
    SearchResults {
        best_fit: CaseResult {
            id: "no-results".to_string(),
            name: "No cases found".to_string(),
            court_label: String::new(),
            year: now_year,
            authority: Authority::Persuasive,
            issue_tags: vec![format!("Rule {}", rule_token)],
            url: None,
            snippets: vec![Snippet {
                label: "Summary".to_string(),
                text: "No matching cases were found. Try broadening the time window or relaxing filters."
                    .to_string(),
                highlight: None,
            }],
        },
        cases: Vec::new(),
        why_fits: vec![
            "No results matched the current filters.".to_string(),
            "Try broadening the jurisdiction or time window.".to_string(),
        ],
        rule_explainer: None,
        debug,
    }
}
