//! Incremental indexing driver.
//!
//! Feeds the names of parsed translation units into their linkage. Each unit
//! is indexed inside its own write section: a unit either commits completely
//! or leaves no trace, and a storage fault in one unit does not stop the run.

use crate::incremental::ChangeDetector;
use crate::{Database, Linkage};
use cxindex_core::{CxindexError, IndexingConfig, Resolution, TranslationUnit};
use cxindex_storage::WriteSection;

/// Result of indexing a batch of translation units.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexResult {
    /// Total number of units handed to the indexer.
    pub units_seen: usize,
    /// Number of units committed.
    pub units_indexed: usize,
    /// Number of units skipped (unchanged since last index).
    pub units_skipped: usize,
    /// Number of units abandoned after a fault.
    pub units_failed: usize,
    /// Names visited across all committed units.
    pub names_seen: usize,
    /// Names that yielded a persisted binding.
    pub bindings_recorded: usize,
    /// Records allocated across all committed units.
    pub records_created: usize,
}

#[derive(Debug, Default)]
struct UnitStats {
    names_seen: usize,
    bindings_recorded: usize,
    records_created: usize,
}

/// The incremental indexing pipeline.
pub struct Indexer<'d> {
    database: &'d Database,
    config: IndexingConfig,
    change_detector: ChangeDetector,
}

impl<'d> Indexer<'d> {
    /// Create an Indexer whose change detector is loaded from the database.
    pub fn new(database: &'d Database, config: IndexingConfig) -> Self {
        let mut change_detector = ChangeDetector::new();
        change_detector.load_from_storage(database.store());
        Self::with_change_detector(database, config, change_detector)
    }

    pub fn with_change_detector(
        database: &'d Database,
        config: IndexingConfig,
        change_detector: ChangeDetector,
    ) -> Self {
        Self {
            database,
            config,
            change_detector,
        }
    }

    pub fn change_detector(&self) -> &ChangeDetector {
        &self.change_detector
    }

    /// Index every unit, skipping unchanged ones.
    ///
    /// Storage faults and unknown linkages abandon only the affected unit.
    /// Any other error (a poisoned writer lock) stops the run.
    pub fn index_units<'u, I>(&mut self, units: I) -> Result<IndexResult, CxindexError>
    where
        I: IntoIterator<Item = &'u dyn TranslationUnit>,
    {
        let mut result = IndexResult::default();

        for unit in units {
            result.units_seen += 1;
            let path = unit.path();

            if self.config.skip_unchanged && !self.change_detector.is_changed(path, unit.content())
            {
                result.units_skipped += 1;
                continue;
            }

            let hash = ChangeDetector::hash_content(unit.content());
            match self.index_unit(unit, &hash) {
                Ok(stats) => {
                    self.change_detector.update_hash(path, hash);
                    result.units_indexed += 1;
                    result.names_seen += stats.names_seen;
                    result.bindings_recorded += stats.bindings_recorded;
                    result.records_created += stats.records_created;
                }
                Err(e) if e.is_storage_fault() || matches!(e, CxindexError::UnknownLinkage(_)) => {
                    tracing::warn!("Abandoned {}: {}", path, e);
                    result.units_failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Indexed {} units: {} committed, {} skipped, {} failed, {} bindings, {} new records",
            result.units_seen,
            result.units_indexed,
            result.units_skipped,
            result.units_failed,
            result.bindings_recorded,
            result.records_created,
        );

        Ok(result)
    }

    /// Forget a unit's hash so the next run re-indexes it.
    pub fn forget_unit(&mut self, path: &str) -> Result<bool, CxindexError> {
        let removed = self
            .database
            .store()
            .write(|section| section.remove_unit_hash(path))?;
        self.change_detector.remove_hash(path);
        Ok(removed)
    }

    fn index_unit(
        &self,
        unit: &dyn TranslationUnit,
        hash: &str,
    ) -> Result<UnitStats, CxindexError> {
        let linkage = self.database.linkage(unit.linkage_id())?;
        let section = self.database.store().begin_write()?;

        match self.record_names(&section, linkage, unit) {
            Ok(stats) => {
                section.save_unit_hash(unit.path(), hash)?;
                section.commit()?;
                tracing::debug!(
                    "Committed {}: {} names, {} bindings",
                    unit.path(),
                    stats.names_seen,
                    stats.bindings_recorded
                );
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback) = section.abandon() {
                    tracing::warn!("Failed to abandon {}: {}", unit.path(), rollback);
                }
                Err(e)
            }
        }
    }

    fn record_names(
        &self,
        section: &WriteSection<'_>,
        linkage: &dyn Linkage,
        unit: &dyn TranslationUnit,
    ) -> Result<UnitStats, CxindexError> {
        let before = section.reader().record_count()?;
        let mut stats = UnitStats::default();

        for name in unit.names() {
            stats.names_seen += 1;

            let refresh = match name.resolve() {
                Resolution::Binding(live)
                    if self.config.refresh_definitions && name.is_definition() =>
                {
                    // Only bindings that already existed need their attributes rewritten.
                    linkage
                        .adapt_binding(&section.reader(), live)?
                        .map(|_| live)
                }
                _ => None,
            };

            let Some(binding) = linkage.add_binding_for_name(section, name)? else {
                continue;
            };
            stats.bindings_recorded += 1;

            if let Some(live) = refresh {
                linkage.refresh_binding(section, &binding, live)?;
            }
        }

        stats.records_created = section.reader().record_count()?.saturating_sub(before);
        Ok(stats)
    }
}
