//! Heuristic doc ↔ doctype candidate matching.
//!
//! Scores are advisory: the matcher proposes, the registry records drafts,
//! and only a human enables a mapping.

use manifold_config::MatcherConfig;
use manifold_schema::wire::SourceInventory;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{cmp::Ordering, collections::BTreeSet};

/// Mapping method recorded in seed reports.
pub const MAPPING_METHOD: &str = "token_overlap";

///
/// Tokenizer
///
/// Lowercase ASCII alphanumeric runs, minus stop words, pure digits and
/// single characters.  Output is a sorted set, so downstream iteration is
/// deterministic.
///

#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
    stop_words: BTreeSet<String>,
}

impl Tokenizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn tokenize(&self, parts: &[&str]) -> BTreeSet<String> {
        let text = parts.join(" ").to_lowercase();

        text.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| t.len() > 1)
            .filter(|t| !t.bytes().all(|b| b.is_ascii_digit()))
            .filter(|t| !self.stop_words.contains(*t))
            .map(ToString::to_string)
            .collect()
    }
}

///
/// ScoringStrategy
///

pub trait ScoringStrategy {
    /// Fit of a source token set against a target token set; 0 excludes.
    fn score(&self, target: &BTreeSet<String>, source: &BTreeSet<String>) -> f64;
}

///
/// TokenOverlap
/// |overlap| plus a bonus for each domain term in the overlap
///

#[derive(Clone, Debug)]
pub struct TokenOverlap {
    pub domain_terms: BTreeSet<String>,
    pub domain_bonus: f64,
}

impl ScoringStrategy for TokenOverlap {
    fn score(&self, target: &BTreeSet<String>, source: &BTreeSet<String>) -> f64 {
        let overlap = target.intersection(source);
        let mut fit = 0.0;

        for token in overlap {
            fit += 1.0;
            if self.domain_terms.contains(token) {
                fit += self.domain_bonus;
            }
        }

        round2(fit)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

///
/// Confidence
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

///
/// MatchTarget
/// a doc looking for a source doctype
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MatchTarget {
    pub doc_key: String,
    pub doc_code: Option<String>,
    pub doc_title: Option<String>,
    pub doc_kind: Option<String>,
    pub doc_role: Option<String>,
    pub bundle_id: Option<String>,
    pub app_id: Option<String>,
    pub module_id: Option<String>,
    pub submodule_id: Option<String>,
    pub doc_path: String,
}

impl MatchTarget {
    #[must_use]
    pub fn tokens(&self, tokenizer: &Tokenizer) -> BTreeSet<String> {
        tokenizer.tokenize(&[
            self.doc_title.as_deref().unwrap_or_default(),
            &self.doc_key,
            self.module_id.as_deref().unwrap_or_default(),
            self.submodule_id.as_deref().unwrap_or_default(),
        ])
    }
}

///
/// SourceDoctype
///

#[derive(Clone, Debug)]
pub struct SourceDoctype {
    pub repo_name: Option<String>,
    pub doctype_name: Option<String>,
    pub module_name: Option<String>,
    pub package_name: Option<String>,
    pub is_table: Value,
    pub json_file: String,
    pub tokens: BTreeSet<String>,
}

///
/// SourceCorpus
/// flattened inventory rows that point at a JSON file
///

#[derive(Clone, Debug, Default)]
pub struct SourceCorpus {
    pub doctypes: Vec<SourceDoctype>,
}

impl SourceCorpus {
    #[must_use]
    pub fn from_inventory(inventory: SourceInventory, tokenizer: &Tokenizer) -> Self {
        let mut doctypes = Vec::new();

        for repo in inventory.repos {
            for row in repo.doctypes {
                let Some(json_file) = row.json_file.filter(|f| !f.is_empty()) else {
                    continue;
                };
                let tokens = tokenizer.tokenize(&[
                    row.doctype_name.as_deref().unwrap_or_default(),
                    row.module_name.as_deref().unwrap_or_default(),
                    row.package_name.as_deref().unwrap_or_default(),
                    repo.repo_name.as_deref().unwrap_or_default(),
                ]);

                doctypes.push(SourceDoctype {
                    repo_name: repo.repo_name.clone(),
                    doctype_name: row.doctype_name,
                    module_name: row.module_name,
                    package_name: row.package_name,
                    is_table: row.is_table,
                    json_file,
                    tokens,
                });
            }
        }

        Self { doctypes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doctypes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doctypes.is_empty()
    }
}

///
/// Candidate
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Candidate {
    pub fit_score: f64,
    pub repo_name: Option<String>,
    pub doctype_name: Option<String>,
    pub module_name: Option<String>,
    pub package_name: Option<String>,
    pub is_table: Value,
    pub json_file: Option<String>,
    pub token_overlap: Vec<String>,
}

// best first, then repo name, then doctype name
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.fit_score
        .total_cmp(&a.fit_score)
        .then_with(|| a.repo_name.cmp(&b.repo_name))
        .then_with(|| a.doctype_name.cmp(&b.doctype_name))
}

///
/// Matcher
///

pub struct Matcher {
    tokenizer: Tokenizer,
    strategy: Box<dyn ScoringStrategy>,
    max_candidates: usize,
    high_confidence: f64,
}

impl Matcher {
    #[must_use]
    pub fn new(config: &MatcherConfig) -> Self {
        let strategy = TokenOverlap {
            domain_terms: config.domain_terms.iter().cloned().collect(),
            domain_bonus: config.domain_bonus,
        };

        Self::with_strategy(config, Box::new(strategy))
    }

    #[must_use]
    pub fn with_strategy(config: &MatcherConfig, strategy: Box<dyn ScoringStrategy>) -> Self {
        Self {
            tokenizer: Tokenizer::new(&config.stop_words),
            strategy,
            max_candidates: config.max_candidates,
            high_confidence: config.high_confidence,
        }
    }

    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    // propose_candidates
    /// Up to `max_candidates` source doctypes, best first.
    #[must_use]
    pub fn propose_candidates(
        &self,
        target: &MatchTarget,
        corpus: &SourceCorpus,
    ) -> Vec<Candidate> {
        let target_tokens = target.tokens(&self.tokenizer);
        if target_tokens.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = corpus
            .doctypes
            .iter()
            .filter_map(|source| {
                let fit = self.strategy.score(&target_tokens, &source.tokens);
                if fit <= 0.0 {
                    return None;
                }

                Some(Candidate {
                    fit_score: fit,
                    repo_name: source.repo_name.clone(),
                    doctype_name: source.doctype_name.clone(),
                    module_name: source.module_name.clone(),
                    package_name: source.package_name.clone(),
                    is_table: source.is_table.clone(),
                    json_file: Some(source.json_file.clone()),
                    token_overlap: target_tokens.intersection(&source.tokens).cloned().collect(),
                })
            })
            .collect();

        candidates.sort_by(rank);
        candidates.truncate(self.max_candidates);

        candidates
    }

    /// `high` when the best fit reaches the threshold, `medium` for any
    /// other candidate, nothing without candidates.
    #[must_use]
    pub fn confidence(&self, candidates: &[Candidate]) -> Option<Confidence> {
        candidates.first().map(|top| {
            if top.fit_score >= self.high_confidence {
                Confidence::High
            } else {
                Confidence::Medium
            }
        })
    }

    // seed_mapping
    /// Candidate report for every target, in target order.
    #[must_use]
    pub fn seed_mapping(
        &self,
        targets: &[MatchTarget],
        corpus: &SourceCorpus,
        bundle: &str,
    ) -> SeedReport {
        let mut mappings = Vec::with_capacity(targets.len());
        let mut mapped = 0;

        for target in targets {
            let mut candidates = self.propose_candidates(target, corpus);
            let confidence = self.confidence(&candidates);
            let top = (!candidates.is_empty()).then(|| candidates.remove(0));

            let mapping_status = if top.is_some() {
                mapped += 1;
                SeedStatus::MappedCandidate
            } else {
                SeedStatus::BuildFromScratch
            };

            mappings.push(SeedRow {
                mapping_status,
                confidence,
                source_doc: target.clone(),
                top_match: top,
                alternate_candidates: candidates,
            });
        }

        SeedReport {
            generated_for: bundle.to_string(),
            mapping_method: MAPPING_METHOD.to_string(),
            counts: SeedCounts {
                target_doc_count: targets.len(),
                mapped_candidate_count: mapped,
                build_from_scratch_count: targets.len() - mapped,
            },
            mappings,
        }
    }
}

///
/// SeedStatus
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStatus {
    MappedCandidate,
    BuildFromScratch,
}

///
/// SeedReport
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SeedReport {
    pub generated_for: String,
    pub mapping_method: String,
    pub counts: SeedCounts,
    pub mappings: Vec<SeedRow>,
}

impl SeedReport {
    /// Seed row for a doc key, if the report covers it.
    #[must_use]
    pub fn row(&self, doc_key: &str) -> Option<&SeedRow> {
        self.mappings.iter().find(|r| r.source_doc.doc_key == doc_key)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SeedCounts {
    pub target_doc_count: usize,
    pub mapped_candidate_count: usize,
    pub build_from_scratch_count: usize,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeedRow {
    pub mapping_status: SeedStatus,

    #[serde(default)]
    pub confidence: Option<Confidence>,

    #[serde(rename = "source_doc", alias = "3plug_doc")]
    pub source_doc: MatchTarget,

    #[serde(rename = "match", alias = "frappe_doctype_match", default)]
    pub top_match: Option<Candidate>,

    #[serde(default)]
    pub alternate_candidates: Vec<Candidate>,
}

///
/// TESTS
///
