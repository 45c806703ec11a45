//! Mapping verbs: seed report, registry expansion and draft fill, each
//! reading and writing the configured mapping files.

use crate::{
    discover::{find_doc_folders, match_targets},
    error::{Error, RegistryError},
    fs::{ArtifactSink, write_json},
    load::{load_json, load_source_corpus},
    matcher::{Matcher, SeedReport, SourceCorpus},
    registry::{DocTarget, ExpandCounts, FillStats, MappingRegistry},
};
use manifold_config::Config;
use tracing::info;

// seed_mapping
/// Propose candidates for every doc of the configured bundle and write the
/// seed report.
pub fn seed_mapping(config: &Config, sink: &mut dyn ArtifactSink) -> Result<SeedReport, Error> {
    let matcher = Matcher::new(&config.matcher);
    let inventory = load_source_corpus(&config.source_inventory())?;
    let corpus = SourceCorpus::from_inventory(inventory, matcher.tokenizer());

    let folders = find_doc_folders(&config.app_root(&config.runtime.app));
    let targets = match_targets(&folders, config.root(), &config.runtime.bundle);
    info!(targets = targets.len(), sources = corpus.len(), "matching docs");

    let report = matcher.seed_mapping(&targets, &corpus, &config.runtime.bundle);
    write_json(sink, &config.seed_mapping_path(), &report)?;

    Ok(report)
}

// expand_registry
pub fn expand_registry(
    config: &Config,
    sink: &mut dyn ArtifactSink,
) -> Result<ExpandCounts, RegistryError> {
    let path = config.exact_mapping_path();
    let mut registry = MappingRegistry::load(&path)?;

    let targets: Vec<DocTarget> = find_doc_folders(&config.app_root(&config.runtime.app))
        .iter()
        .map(|folder| DocTarget::from_folder(folder, config.root()))
        .collect();

    let counts = registry.expand(&targets);
    registry.save(sink, &path)?;

    Ok(counts)
}

// fill_registry
/// Draft candidates for placeholders from the last seed report.
pub fn fill_registry(
    config: &Config,
    sink: &mut dyn ArtifactSink,
) -> Result<FillStats, RegistryError> {
    let path = config.exact_mapping_path();
    let mut registry = MappingRegistry::load(&path)?;
    let seed: SeedReport = load_json(&config.seed_mapping_path())?;

    let stats = registry.fill_placeholders(&seed);
    registry.save(sink, &path)?;

    Ok(stats)
}
