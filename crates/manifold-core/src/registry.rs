//! The reviewed doc ↔ doctype mapping registry.
//!
//! Records start as placeholders, may be filled with a disabled draft from
//! the seed report, and are enabled only by hand.  Keys this crate does not
//! know are carried through every rewrite.

use crate::{
    discover::{DocFolder, relative_display},
    error::RegistryError,
    fs::{ArtifactSink, write_json},
    load::load_json,
    matcher::{Confidence, SeedReport},
    translate::to_bool,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
};
use tracing::warn;

pub const STATUS_EXPANDED: &str = "expanded_template_manual_review_required";
pub const STATUS_DRAFTED: &str = "expanded_template_with_draft_candidates_manual_review_required";

const PLACEHOLDER_NOTE: &str = "Fill exact json_file from the source inventory after review.";
const SCRATCH_NOTE: &str =
    "No candidate in seed mapping. Build from scratch unless manually mapped.";

///
/// MappingStatus
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum MappingStatus {
    Placeholder,
    DraftCandidate,
    BuildFromScratch,
    Other(String),
}

impl From<String> for MappingStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "placeholder" => Self::Placeholder,
            "draft_candidate" => Self::DraftCandidate,
            "build_from_scratch" => Self::BuildFromScratch,
            _ => Self::Other(s),
        }
    }
}

impl From<MappingStatus> for String {
    fn from(status: MappingStatus) -> Self {
        match status {
            MappingStatus::Placeholder => "placeholder".to_string(),
            MappingStatus::DraftCandidate => "draft_candidate".to_string(),
            MappingStatus::BuildFromScratch => "build_from_scratch".to_string(),
            MappingStatus::Other(s) => s,
        }
    }
}

///
/// DocRef
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DocRef {
    pub doc_key: Option<String>,
    pub doc_path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

///
/// MatchSlot
/// the source doctype a record points at; empty for placeholders
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MatchSlot {
    pub repo_name: Option<String>,
    pub doctype_name: Option<String>,
    pub json_file: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchSlot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.json_file.as_deref().is_none_or(str::is_empty)
    }
}

///
/// MappingRecord
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MappingRecord {
    #[serde(deserialize_with = "lenient_bool")]
    pub enabled: bool,

    #[serde(rename = "source_doc", alias = "3plug_doc")]
    pub source_doc: DocRef,

    #[serde(rename = "match", alias = "frappe_doctype_match", deserialize_with = "lenient_slot")]
    pub top_match: MatchSlot,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MappingStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MappingRecord {
    #[must_use]
    pub fn placeholder(doc_key: &str, doc_path: &str) -> Self {
        Self {
            source_doc: DocRef {
                doc_key: Some(doc_key.to_string()),
                doc_path: Some(doc_path.to_string()),
                extra: Map::new(),
            },
            status: Some(MappingStatus::Placeholder),
            notes: Some(PLACEHOLDER_NOTE.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn doc_key(&self) -> Option<&str> {
        self.source_doc.doc_key.as_deref().filter(|k| !k.is_empty())
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| to_bool(&v))
}

// null reads as an empty slot
fn lenient_slot<'de, D>(deserializer: D) -> Result<MatchSlot, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<MatchSlot>::deserialize(deserializer).map(Option::unwrap_or_default)
}

///
/// ExpandCounts
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExpandCounts {
    pub total_docs: usize,
    pub preserved_existing_mappings: usize,
    pub placeholder_mappings_added: usize,
    pub retained_missing_mappings: usize,

    /// Extra records for a doc key that already has one; kept, not merged.
    pub duplicate_mappings: usize,
    pub enabled_mappings: usize,
}

///
/// FillStats
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FillStats {
    pub rows: usize,
    pub preserved_enabled: usize,
    pub filled_placeholders: usize,
    pub no_seed_candidate: usize,
    pub build_from_scratch_candidates: usize,
}

///
/// MappingRegistry
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MappingRegistry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<Value>,

    pub mappings: Vec<MappingRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_fill_stats: Option<FillStats>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MappingRegistry {
    /// Read a registry file; a missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        match load_json(path) {
            Ok(registry) => Ok(registry),
            Err(err) if err.is_not_found() => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, sink: &mut dyn ArtifactSink, path: &Path) -> Result<(), RegistryError> {
        write_json(sink, path, self)?;

        Ok(())
    }

    pub fn enabled(&self) -> impl Iterator<Item = &MappingRecord> {
        self.mappings.iter().filter(|r| r.enabled)
    }

    // expand
    /// Union of the existing records with `targets`.
    ///
    /// Targets come first, in the order given, reusing an existing record
    /// verbatim where one exists.  Records for vanished targets follow in
    /// their previous order.
    pub fn expand(&mut self, targets: &[DocTarget]) -> ExpandCounts {
        let mut existing: Vec<Option<MappingRecord>> =
            std::mem::take(&mut self.mappings).into_iter().map(Some).collect();

        let mut by_key: HashMap<String, usize> = HashMap::new();
        for (i, record) in existing.iter().enumerate() {
            if let Some(key) = record.as_ref().and_then(MappingRecord::doc_key) {
                by_key.entry(key.to_string()).or_insert(i);
            }
        }

        let mut counts = ExpandCounts {
            total_docs: targets.len(),
            ..ExpandCounts::default()
        };
        let mut mappings = Vec::with_capacity(existing.len().max(targets.len()));

        for target in targets {
            let reused = by_key
                .get(&target.doc_key)
                .and_then(|&i| existing.get_mut(i))
                .and_then(Option::take);

            if let Some(record) = reused {
                counts.preserved_existing_mappings += 1;
                mappings.push(record);
            } else {
                counts.placeholder_mappings_added += 1;
                mappings.push(MappingRecord::placeholder(&target.doc_key, &target.doc_path));
            }
        }

        let target_keys: HashSet<&str> = targets.iter().map(|t| t.doc_key.as_str()).collect();
        for record in existing.into_iter().flatten() {
            match record.doc_key().filter(|key| target_keys.contains(key)) {
                Some(key) => {
                    warn!(doc_key = key, "duplicate mapping record");
                    counts.duplicate_mappings += 1;
                }
                None => counts.retained_missing_mappings += 1,
            }
            mappings.push(record);
        }

        counts.enabled_mappings = mappings.iter().filter(|r| r.enabled).count();
        self.mappings = mappings;
        self.status = Some(STATUS_EXPANDED.to_string());
        self.counts = serde_json::to_value(counts).ok();

        counts
    }

    // fill_placeholders
    /// Attach seed candidates to disabled records with an empty match slot.
    /// Filled records stay disabled.
    pub fn fill_placeholders(&mut self, seed: &SeedReport) -> FillStats {
        let mut stats = FillStats::default();

        for record in &mut self.mappings {
            stats.rows += 1;
            if record.enabled {
                stats.preserved_enabled += 1;
                continue;
            }
            if !record.top_match.is_empty() {
                continue;
            }

            let Some(row) = record.doc_key().and_then(|key| seed.row(key)) else {
                stats.no_seed_candidate += 1;
                continue;
            };

            let Some(top) = &row.top_match else {
                stats.build_from_scratch_candidates += 1;
                record.status = Some(MappingStatus::BuildFromScratch);
                record.notes = Some(SCRATCH_NOTE.to_string());
                continue;
            };

            record.top_match = MatchSlot {
                repo_name: top.repo_name.clone(),
                doctype_name: top.doctype_name.clone(),
                json_file: top.json_file.clone(),
                extra: Map::new(),
            };
            record.fit_score = Some(top.fit_score);
            record.confidence = row.confidence;
            record.status = Some(MappingStatus::DraftCandidate);
            record.notes = Some(format!(
                "Draft candidate from seed mapping (fit={}, confidence={}). \
                 Review exactness before enabling.",
                top.fit_score,
                row.confidence.map_or("none", Confidence::as_str),
            ));
            stats.filled_placeholders += 1;
        }

        self.status = Some(STATUS_DRAFTED.to_string());
        self.draft_fill_stats = Some(stats);

        stats
    }
}

///
/// DocTarget
/// a doc the registry should hold a record for
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocTarget {
    pub doc_key: String,
    pub doc_path: String,
}

impl DocTarget {
    #[must_use]
    pub fn from_folder(folder: &DocFolder, root: &Path) -> Self {
        Self {
            doc_key: folder.doc_key.clone(),
            doc_path: relative_display(&folder.path, root),
        }
    }
}

///
/// TESTS
///
