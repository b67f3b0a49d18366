//! Process-wide credential table.
//!
//! Maps entry ids to their current record. Records are swapped whole; readers
//! keep whichever `Arc` they obtained, so a send already in flight finishes
//! with the record it started with.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use pingie_core::{CredentialRecord, EntryId};

use crate::error::HostError;

#[derive(Debug, Default)]
pub struct CredentialTable {
    entries: RwLock<HashMap<EntryId, Arc<CredentialRecord>>>,
}

impl CredentialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale-replace the record for `id`.
    pub fn insert(&self, id: EntryId, record: CredentialRecord) -> Result<(), HostError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| HostError::lock_poisoned("credential table"))?;
        entries.insert(id, Arc::new(record));
        Ok(())
    }

    pub fn get(&self, id: &EntryId) -> Result<Option<Arc<CredentialRecord>>, HostError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| HostError::lock_poisoned("credential table"))?;
        Ok(entries.get(id).cloned())
    }

    pub fn remove(&self, id: &EntryId) -> Result<Option<Arc<CredentialRecord>>, HostError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| HostError::lock_poisoned("credential table"))?;
        Ok(entries.remove(id))
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
