/// Mapping store: CRUD over the composite collection

use crate::backend::StorageArea;
use crate::clock::{Clock, SystemClock};
use crate::error::{GoLinkError, Result};
use crate::mapping::{Mapping, validate_short_name, validate_url};
use crate::storage::{
    EXPORT_VERSION, ExportBundle, ImportBundle, ImportEntry, ImportReport, MappingCollection,
    RejectedEntry,
};
use futures::lock::Mutex;
use std::collections::BTreeMap;

/// Owns the persisted mapping collection.
///
/// Every operation reads the whole collection from one storage key and,
/// for writes, stores the whole collection back. Writers queue on
/// `write_queue` so two saves on this instance never interleave their
/// read and write; reads do not wait. Build one store per storage area.
pub struct MappingStore<S> {
    storage: S,
    key: String,
    clock: Box<dyn Clock>,
    write_queue: Mutex<()>,
}

impl<S: StorageArea> MappingStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        MappingStore {
            storage,
            key: key.into(),
            clock: Box::new(SystemClock),
            write_queue: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Create or overwrite a mapping.
    ///
    /// Validation runs before any storage access. Overwrites keep the
    /// original `created_at`.
    pub async fn save(&self, short_name: &str, url: &str, description: &str) -> Result<Mapping> {
        validate_short_name(short_name)?;
        validate_url(url)?;

        let _writer = self.write_queue.lock().await;
        let mut collection = self.load().await?;
        let mapping = collection.upsert(
            short_name,
            url.to_string(),
            description.to_string(),
            self.now_millis(),
        );
        self.persist(&collection).await?;

        log::info!("Saved go/{short_name} -> {url}");
        Ok(mapping)
    }

    pub async fn get(&self, short_name: &str) -> Result<Option<Mapping>> {
        let collection = self.load().await?;
        Ok(collection.get(short_name).cloned())
    }

    pub async fn get_all(&self) -> Result<BTreeMap<String, Mapping>> {
        Ok(self.load().await?.mappings)
    }

    /// Remove a mapping. Deleting a missing short name succeeds.
    pub async fn delete(&self, short_name: &str) -> Result<()> {
        let _writer = self.write_queue.lock().await;
        let mut collection = self.load().await?;

        if collection.remove(short_name) {
            self.persist(&collection).await?;
            log::info!("Deleted go/{short_name}");
        } else {
            log::debug!("Delete of go/{short_name} ignored, no such mapping");
        }

        Ok(())
    }

    /// Drop every mapping at once.
    pub async fn clear(&self) -> Result<()> {
        let _writer = self.write_queue.lock().await;
        self.storage.remove(&self.key).await?;
        log::info!("Cleared all mappings");
        Ok(())
    }

    pub async fn export(&self) -> Result<ExportBundle> {
        let mappings = self.get_all().await?;

        Ok(ExportBundle {
            version: EXPORT_VERSION.to_string(),
            exported: self.clock.now().to_string(),
            mappings,
        })
    }

    /// Merge an import into the collection with one write.
    ///
    /// Entries are validated like `save`; invalid ones are reported and
    /// skipped. Existing mappings keep their `created_at`.
    pub async fn import(&self, bundle: ImportBundle) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut accepted = Vec::new();

        for (short_name, raw) in bundle.mappings {
            match read_import_entry(&short_name, raw) {
                Ok(entry) => accepted.push((short_name, entry)),
                Err(e) => report.rejected.push(RejectedEntry {
                    short_name,
                    error: e.to_string(),
                }),
            }
        }

        if accepted.is_empty() {
            return Ok(report);
        }

        let _writer = self.write_queue.lock().await;
        let mut collection = self.load().await?;
        let now = self.now_millis();
        for (short_name, entry) in accepted {
            collection.upsert(&short_name, entry.url, entry.description, now);
            report.imported += 1;
        }
        self.persist(&collection).await?;

        log::info!(
            "Imported {} mappings ({} rejected)",
            report.imported,
            report.rejected.len()
        );
        Ok(report)
    }

    async fn load(&self) -> Result<MappingCollection> {
        let stored = self.storage.get(&self.key).await?;
        Ok(MappingCollection::from_stored(stored))
    }

    async fn persist(&self, collection: &MappingCollection) -> Result<()> {
        self.storage.set(&self.key, collection.to_stored()).await?;
        Ok(())
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().as_millisecond()
    }
}

fn read_import_entry(short_name: &str, raw: serde_json::Value) -> Result<ImportEntry> {
    validate_short_name(short_name)?;
    let entry: ImportEntry = serde_json::from_value(raw)
        .map_err(|e| GoLinkError::InvalidImport(format!("unreadable entry: {e}")))?;
    validate_url(&entry.url)?;
    Ok(entry)
}
