//! Generic record store
//!
//! `RecordStore<T, P>` owns the authoritative, ordered collection of one
//! record kind and keeps it in sync with a [`KvProvider`] slot. Every
//! mutation rewrites the whole slot before returning.
//!
//! ## Addressing
//!
//! Mutations are keyed by [`RecordId`]. The `*_at` variants take a position
//! in the current unfiltered ordering and resolve it to an id first; use
//! them only when the position comes from that same ordering.
//!
//! ## Lifecycle
//!
//! ```text
//! let mut products = RecordStore::<Product, _>::open(FileProvider::new(dir))?;
//! let added = products.add(ProductDraft::new("Vitamin C").quantity(5.0).price(9.99))?;
//! let page = products.query(&Query::new().search("vit"));
//! products.delete(added.id())?;
//! ```

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::entity::Entity;
use crate::models::{EntityKind, RecordId};
use crate::query::{self, Query, QueryView};
use crate::storage::{KvProvider, StoreError, StoreResult};
use crate::validation;

/// How an import combines with the existing collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep existing records and add the imported ones after them
    #[default]
    Append,
    /// Discard existing records first
    Replace,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Records added to the collection
    pub imported: usize,
    /// Records whose id was missing and got a generated one
    pub generated_ids: usize,
    /// Records whose id collided and was replaced
    pub reassigned_ids: Vec<RecordId>,
    /// Elements that could not be read as records, with the reason
    pub skipped: Vec<SkippedRecord>,
}

/// An import element that failed type coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Ordered, persisted collection of one record kind
pub struct RecordStore<T: Entity, P: KvProvider> {
    records: Vec<T>,
    provider: P,
    /// Every id seen in this store's lifetime, so generated ids never repeat
    issued: HashSet<RecordId>,
    dirty: bool,
    recovered_from_corruption: bool,
    today: fn() -> NaiveDate,
}

impl<T: Entity, P: KvProvider> RecordStore<T, P> {
    /// Create an empty store without reading the provider
    pub fn new(provider: P) -> Self {
        Self {
            records: Vec::new(),
            provider,
            issued: HashSet::new(),
            dirty: false,
            recovered_from_corruption: false,
            today: local_today,
        }
    }

    /// Create a store and load its slot
    ///
    /// An unreadable slot is copied to `<key>.corrupt` and the store starts
    /// empty; [`recovered_from_corruption`](Self::recovered_from_corruption)
    /// reports that this happened. Nothing is overwritten until the first
    /// mutation or [`flush`](Self::flush).
    pub fn open(provider: P) -> StoreResult<Self> {
        let mut store = Self::new(provider);
        match store.load() {
            Ok(count) => {
                debug!(kind = %T::KIND, count, "opened store");
            }
            Err(StoreError::CorruptStore { key, details }) => {
                warn!(key = %key, details = %details, "stored data is unreadable; starting empty");
                store.back_up_slot(&key);
                store.recovered_from_corruption = true;
            }
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    /// Replace the clock used for date defaults (tests)
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    fn key(&self) -> &'static str {
        T::KIND.storage_key()
    }

    /// Read the slot into memory
    ///
    /// A missing slot yields an empty collection. A malformed one leaves the
    /// collection empty and returns [`StoreError::CorruptStore`].
    pub fn load(&mut self) -> StoreResult<usize> {
        let key = self.key();
        let bytes = self
            .provider
            .get(key)
            .map_err(|source| StoreError::PersistenceUnavailable {
                key: key.to_string(),
                source,
            })?;

        self.records.clear();
        self.dirty = false;

        let Some(bytes) = bytes else {
            return Ok(0);
        };

        let mut records: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptStore {
                key: key.to_string(),
                details: e.to_string(),
            })?;

        // Slots written by older versions can hold repeated ids
        let mut seen = HashSet::new();
        for record in records.iter_mut() {
            if record.id().is_blank() || !seen.insert(record.id().clone()) {
                let id = self.fresh_id_excluding(&seen);
                warn!(key, old = %record.id(), new = %id, "reassigned duplicate id");
                seen.insert(id.clone());
                record.set_id(id);
                self.dirty = true;
            }
        }

        self.issued.extend(seen);
        self.records = records;
        Ok(self.records.len())
    }

    /// Write the whole collection to the slot
    pub fn flush(&mut self) -> StoreResult<()> {
        self.persist()
    }

    fn persist(&mut self) -> StoreResult<()> {
        let key = self.key();
        let bytes = serde_json::to_vec(&self.records)?;
        match self.provider.set(key, &bytes) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(source) => {
                self.dirty = true;
                warn!(key, error = %source, "write failed; change kept in memory only");
                Err(StoreError::PersistenceUnavailable {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    fn back_up_slot(&self, key: &str) {
        let backup_key = format!("{}.corrupt", key);
        let result = self
            .provider
            .get(key)
            .and_then(|bytes| match bytes {
                Some(bytes) => self.provider.set(&backup_key, &bytes),
                None => Ok(()),
            });
        match result {
            Ok(()) => info!(key, backup = %backup_key, "backed up unreadable slot"),
            Err(e) => warn!(key, error = %e, "could not back up unreadable slot"),
        }
    }

    fn fresh_id_excluding(&mut self, also_taken: &HashSet<RecordId>) -> RecordId {
        loop {
            let id = RecordId::generate();
            if !self.issued.contains(&id) && !also_taken.contains(&id) {
                self.issued.insert(id.clone());
                return id;
            }
        }
    }

    fn fresh_id(&mut self) -> RecordId {
        self.fresh_id_excluding(&HashSet::new())
    }

    // ==================== Reads ====================

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Current position of `id` in the unfiltered ordering
    pub fn position_of(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Id of the record at `position` in the unfiltered ordering
    pub fn id_at(&self, position: usize) -> StoreResult<RecordId> {
        self.records
            .get(position)
            .map(|r| r.id().clone())
            .ok_or(StoreError::IndexOutOfRange {
                position,
                len: self.records.len(),
            })
    }

    /// True when the last write failed and memory is ahead of the slot
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when `open` found an unreadable slot and started empty
    pub fn recovered_from_corruption(&self) -> bool {
        self.recovered_from_corruption
    }

    /// Filter, sort and paginate without touching the store
    pub fn query(&self, query: &Query) -> QueryView<T> {
        debug!(kind = %T::KIND, search = %query.search, page = query.page, "query");
        query::run(&self.records, query)
    }

    // ==================== Mutations ====================

    /// Validate and append a new record
    ///
    /// The record gets a fresh id (any id in the draft is ignored) and,
    /// if the draft has none, today's date. Nothing changes when validation
    /// fails.
    pub fn add(&mut self, draft: T::Draft) -> StoreResult<T> {
        validation::validate(&draft, T::rules()).map_err(StoreError::Validation)?;

        let id = self.fresh_id();
        let record = T::from_draft(id, draft, (self.today)());
        self.records.push(record.clone());
        info!(kind = %T::KIND, id = %record.id(), "added record");

        self.persist()?;
        Ok(record)
    }

    /// Validate and replace the record with `id`, keeping the id
    ///
    /// An absent date in the draft keeps the record's current date.
    pub fn update(&mut self, id: &RecordId, draft: T::Draft) -> StoreResult<T> {
        let position = self
            .position_of(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        self.replace_at(position, draft)
    }

    /// [`update`](Self::update) addressed by position
    pub fn update_at(&mut self, position: usize, draft: T::Draft) -> StoreResult<T> {
        if position >= self.records.len() {
            warn!(kind = %T::KIND, position, len = self.records.len(), "update of stale position");
            return Err(StoreError::IndexOutOfRange {
                position,
                len: self.records.len(),
            });
        }
        self.replace_at(position, draft)
    }

    fn replace_at(&mut self, position: usize, draft: T::Draft) -> StoreResult<T> {
        validation::validate(&draft, T::rules()).map_err(StoreError::Validation)?;

        let current = &self.records[position];
        let record = T::from_draft(current.id().clone(), draft, current.record_date());
        self.records[position] = record.clone();
        info!(kind = %T::KIND, id = %record.id(), "updated record");

        self.persist()?;
        Ok(record)
    }

    /// Remove the record with `id`
    pub fn delete(&mut self, id: &RecordId) -> StoreResult<T> {
        let position = self
            .position_of(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        self.remove_at(position)
    }

    /// [`delete`](Self::delete) addressed by position
    pub fn delete_at(&mut self, position: usize) -> StoreResult<T> {
        if position >= self.records.len() {
            warn!(kind = %T::KIND, position, len = self.records.len(), "delete of stale position");
            return Err(StoreError::IndexOutOfRange {
                position,
                len: self.records.len(),
            });
        }
        self.remove_at(position)
    }

    fn remove_at(&mut self, position: usize) -> StoreResult<T> {
        let removed = self.records.remove(position);
        info!(kind = %T::KIND, id = %removed.id(), "deleted record");
        self.persist()?;
        Ok(removed)
    }

    /// Remove every record whose id is in `ids`
    ///
    /// Unknown ids are ignored. Returns the number of records removed.
    pub fn bulk_delete<'a, I>(&mut self, ids: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let targets: HashSet<&RecordId> = ids.into_iter().collect();
        let before = self.records.len();
        self.records.retain(|r| !targets.contains(r.id()));
        let removed = before - self.records.len();

        if removed < targets.len() {
            debug!(kind = %T::KIND, missing = targets.len() - removed, "bulk delete skipped unknown ids");
        }
        self.finish_bulk_delete(removed)
    }

    /// Remove every record whose position is in `positions`
    ///
    /// All positions refer to the collection as it was before the call.
    /// Positions past the end are ignored.
    pub fn bulk_delete_at<I>(&mut self, positions: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.records.len();
        let (targets, stale): (HashSet<usize>, HashSet<usize>) =
            positions.into_iter().partition(|p| *p < len);
        if !stale.is_empty() {
            warn!(kind = %T::KIND, ?stale, len, "bulk delete ignored stale positions");
        }

        let mut position = 0;
        self.records.retain(|_| {
            let keep = !targets.contains(&position);
            position += 1;
            keep
        });

        self.finish_bulk_delete(targets.len())
    }

    fn finish_bulk_delete(&mut self, removed: usize) -> StoreResult<usize> {
        if removed == 0 {
            return Ok(0);
        }
        info!(kind = %T::KIND, removed, "bulk deleted records");
        self.persist()?;
        Ok(removed)
    }

    /// Bring in records in bulk
    ///
    /// Drafts are not validated against the add rules: missing ids and
    /// dates are filled in, other absent fields take their zero value.
    /// An id that is blank, collides with a kept record, or repeats within
    /// the batch is replaced with a fresh one.
    pub fn replace_all(&mut self, drafts: Vec<T::Draft>, mode: ImportMode) -> StoreResult<ImportReport> {
        let mut report = ImportReport::default();
        let today = (self.today)();

        let mut taken: HashSet<RecordId> = match mode {
            ImportMode::Append => self.records.iter().map(|r| r.id().clone()).collect(),
            ImportMode::Replace => HashSet::new(),
        };

        let mut imported = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = match T::draft_id(&draft).filter(|id| !id.is_blank()).cloned() {
                Some(id) if !taken.contains(&id) => id,
                Some(id) => {
                    report.reassigned_ids.push(id);
                    self.fresh_id_excluding(&taken)
                }
                None => {
                    report.generated_ids += 1;
                    self.fresh_id_excluding(&taken)
                }
            };
            taken.insert(id.clone());
            self.issued.insert(id.clone());
            imported.push(T::from_draft(id, draft, today));
        }

        report.imported = imported.len();
        match mode {
            ImportMode::Append => self.records.extend(imported),
            ImportMode::Replace => self.records = imported,
        }
        info!(kind = %T::KIND, ?mode, imported = report.imported, "imported records");

        self.persist()?;
        Ok(report)
    }

    /// Import a JSON document whose top level is an array of records
    ///
    /// Anything else is an [`StoreError::ImportFormat`] and leaves the store
    /// unchanged. Elements that cannot be read as records are skipped and
    /// listed in the report.
    pub fn import_json(&mut self, bytes: &[u8], mode: ImportMode) -> StoreResult<ImportReport> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| StoreError::ImportFormat {
            details: format!("not valid JSON: {}", e),
        })?;

        let Value::Array(elements) = value else {
            return Err(StoreError::ImportFormat {
                details: "expected a JSON array of records".to_string(),
            });
        };
        self.import_values(elements, mode)
    }

    /// Import already-parsed JSON elements, skipping unreadable ones
    pub fn import_values(&mut self, elements: Vec<Value>, mode: ImportMode) -> StoreResult<ImportReport> {
        let mut drafts = Vec::with_capacity(elements.len());
        let mut skipped = Vec::new();
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<T::Draft>(element) {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    warn!(kind = %T::KIND, index, error = %e, "skipping unreadable import record");
                    skipped.push(SkippedRecord {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut report = self.replace_all(drafts, mode)?;
        report.skipped = skipped;
        Ok(report)
    }

    /// Drop every record and delete the slot
    ///
    /// Ids issued before the clear are still never handed out again.
    pub fn clear(&mut self) -> StoreResult<usize> {
        let key = self.key();
        self.provider
            .remove(key)
            .map_err(|source| StoreError::PersistenceUnavailable {
                key: key.to_string(),
                source,
            })?;

        let removed = self.records.len();
        self.records.clear();
        self.dirty = false;
        info!(kind = %T::KIND, removed, "cleared store");
        Ok(removed)
    }
}
