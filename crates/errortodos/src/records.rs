//! Error record persistence.
//!
//! All owners' records live in one `errorTodos` document. Every change
//! reads the whole collection, edits it, and writes it back whole inside a
//! single storage transaction.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::forms;
use crate::model::{new_id, ErrorRecord, ErrorRecordPatch, NewErrorRecord};
use crate::storage::{Storage, StorageKey};

/// Record operations over the `errorTodos` document.
#[derive(Debug, Clone, Copy)]
pub struct RecordStore<'a> {
    storage: &'a Storage,
}

impl<'a> RecordStore<'a> {
    /// Create a store backed by `storage`.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn load(&self) -> Result<Vec<ErrorRecord>> {
        self.storage.get_collection(StorageKey::ErrorTodos)
    }

    fn modify<R>(&self, f: impl FnOnce(&mut Vec<ErrorRecord>) -> Result<R>) -> Result<R> {
        self.storage.update_collection(StorageKey::ErrorTodos, f)
    }

    /// Records belonging to `owner_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be read.
    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<ErrorRecord>> {
        let mut records = self.load()?;
        records.retain(|r| r.owner_id == owner_id);
        debug!("Loaded {} records for {}", records.len(), owner_id);
        Ok(records)
    }

    /// Look up a record by id, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be read.
    pub fn get(&self, id: &str) -> Result<Option<ErrorRecord>> {
        Ok(self.load()?.into_iter().find(|r| r.id == id))
    }

    /// Create a record owned by `owner_id`.
    ///
    /// A blank category becomes `default_category`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title or description is blank
    /// (nothing is written), or a storage error.
    pub fn add(
        &self,
        owner_id: &str,
        new: NewErrorRecord,
        default_category: &str,
    ) -> Result<ErrorRecord> {
        forms::validate_new_record(&new)?;

        let category = if new.category.trim().is_empty() {
            default_category.to_string()
        } else {
            new.category
        };
        let record = ErrorRecord {
            id: new_id(),
            title: new.title,
            description: new.description,
            repro_steps: new.repro_steps,
            fix_notes: new.fix_notes,
            code: new.code,
            status: new.status,
            category,
            image: new.image,
            created_at: Utc::now(),
            owner_id: owner_id.to_string(),
        };

        self.modify(|records| {
            records.push(record.clone());
            Ok(())
        })?;

        info!("Added record {} for {}", record.id, owner_id);
        Ok(record)
    }

    /// Merge `patch` into the record with `id` and return the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has `id`,
    /// [`Error::Validation`] if the patch blanks the title or description,
    /// or a storage error.
    pub fn update(&self, id: &str, patch: &ErrorRecordPatch) -> Result<ErrorRecord> {
        if let Some(title) = &patch.title {
            forms::check_required("title", title)?;
        }
        if let Some(description) = &patch.description {
            forms::check_required("description", description)?;
        }

        let updated = self.modify(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Error::not_found(id))?;
            record.apply(patch);
            Ok(record.clone())
        })?;

        info!("Updated record {}", id);
        Ok(updated)
    }

    /// Remove the record with `id`.
    ///
    /// Returns `true` if a record was removed; a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be read or written.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.modify(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() < before)
        })?;

        if removed {
            info!("Deleted record {}", id);
        } else {
            debug!("Delete of missing record {} ignored", id);
        }
        Ok(removed)
    }

    /// Number of records across all owners.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }
}
