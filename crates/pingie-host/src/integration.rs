//! Integration lifecycle.
//!
//! Setup puts an entry's record in the credential table and registers its
//! notification service. Unload undoes both. Reload is unload followed by
//! setup, and runs after every committed reconfiguration.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use pingie_core::{EntryId, PingieConfig};
use pingie_notify::{Commit, NotificationSender, PushClient, Wizard};

use crate::entry::{ConfigEntry, EntryStore};
use crate::error::HostError;
use crate::registry::{ServiceCall, ServiceRegistry};
use crate::table::CredentialTable;

/// Build a sender for `entry_id` from the current table record.
///
/// Returns `None`, with an error logged, when the entry has no record.
pub fn build_sender(
    client: &PushClient,
    table: &CredentialTable,
    entry_id: &EntryId,
) -> Option<NotificationSender> {
    match table.get(entry_id) {
        Ok(Some(record)) => Some(NotificationSender::new(client.clone(), record)),
        Ok(None) => {
            tracing::error!(entry_id = %entry_id, "No credentials stored for entry");
            None
        }
        Err(e) => {
            tracing::error!(entry_id = %entry_id, error = %e, "Could not read credential table");
            None
        }
    }
}

pub struct Integration {
    client: PushClient,
    table: Arc<CredentialTable>,
    registry: ServiceRegistry,
    store: EntryStore,
    entries: RwLock<BTreeMap<EntryId, ConfigEntry>>,
}

impl Integration {
    pub fn new(config: &PingieConfig) -> Result<Self, HostError> {
        let client = PushClient::new(&config.api)?;
        let store = EntryStore::new(config.storage.resolved_entries_path());
        Ok(Self::with_store(client, store))
    }

    pub fn with_store(client: PushClient, store: EntryStore) -> Self {
        Self {
            client,
            table: Arc::new(CredentialTable::new()),
            registry: ServiceRegistry::new(),
            store,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn table(&self) -> &Arc<CredentialTable> {
        &self.table
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Load persisted entries and set each one up, oldest first, so an
    /// entry keeps the service name it held before a restart.
    ///
    /// An entry that fails setup is logged and skipped. Returns how many
    /// entries were set up.
    pub fn start(&self) -> Result<usize, HostError> {
        let loaded = creation_order(self.store.load()?);
        tracing::info!(count = loaded.len(), path = %self.store.path().display(), "Loaded entries");

        {
            let mut entries = self.write_entries()?;
            for entry in &loaded {
                entries.insert(entry.entry_id.clone(), entry.clone());
            }
        }

        let mut ready = 0;
        for entry in &loaded {
            match self.setup(entry) {
                Ok(_) => ready += 1,
                Err(e) => {
                    tracing::error!(entry_id = %entry.entry_id, error = %e, "Entry setup failed")
                }
            }
        }
        Ok(ready)
    }

    pub fn begin_setup(&self) -> Wizard<PushClient> {
        Wizard::begin_setup(self.client.clone())
    }

    /// Start reconfiguring `entry_id`, pre-filled from its current record.
    pub fn begin_reconfigure(&self, entry_id: &EntryId) -> Result<Wizard<PushClient>, HostError> {
        let record = self
            .table
            .get(entry_id)?
            .ok_or_else(|| HostError::EntryNotFound(entry_id.clone()))?;
        Ok(Wizard::begin_reconfigure(self.client.clone(), &record))
    }

    /// Set up a committed setup as a new entry and persist it.
    ///
    /// If either step fails nothing is kept: no service, no table record,
    /// no entry in memory or on disk.
    pub fn create_entry(&self, commit: Commit) -> Result<EntryId, HostError> {
        let entry = ConfigEntry::new(commit.title, commit.record);
        let entry_id = entry.entry_id.clone();

        self.setup(&entry)?;

        let saved = self.write_entries().and_then(|mut entries| {
            let mut updated = entries.clone();
            updated.insert(entry_id.clone(), entry);
            self.save(&updated)?;
            *entries = updated;
            Ok(())
        });
        if let Err(e) = saved {
            self.unload_entry(&entry_id)?;
            return Err(e);
        }
        Ok(entry_id)
    }

    /// Replace an entry's record with a committed reconfiguration, persist
    /// it, and reload. The entry keeps its title.
    ///
    /// The in-memory entry only changes once the store has been written.
    pub fn apply_reconfigure(&self, entry_id: &EntryId, commit: Commit) -> Result<(), HostError> {
        {
            let mut entries = self.write_entries()?;
            let mut updated = entries.clone();
            let entry = updated
                .get_mut(entry_id)
                .ok_or_else(|| HostError::EntryNotFound(entry_id.clone()))?;
            entry.record = commit.record;
            self.save(&updated)?;
            *entries = updated;
        }
        tracing::info!(entry_id = %entry_id, "Credentials updated, reloading entry");
        self.reload_entry(entry_id)
    }

    /// Put the entry's record in the table and register its service.
    /// Returns the registered service name.
    pub fn setup_entry(&self, entry_id: &EntryId) -> Result<String, HostError> {
        let entry = self
            .entry(entry_id)
            .ok_or_else(|| HostError::EntryNotFound(entry_id.clone()))?;
        self.setup(&entry)
    }

    fn setup(&self, entry: &ConfigEntry) -> Result<String, HostError> {
        let entry_id = &entry.entry_id;
        self.table.insert(entry_id.clone(), entry.record.clone())?;
        let sender = build_sender(&self.client, &self.table, entry_id)
            .ok_or_else(|| HostError::EntryNotFound(entry_id.clone()))?;

        let name = match self
            .registry
            .register(entry_id, &entry.title, Arc::new(sender))
        {
            Ok(name) => name,
            Err(e) => {
                self.table.remove(entry_id)?;
                return Err(e);
            }
        };
        tracing::info!(
            entry_id = %entry_id,
            title = %entry.title,
            service = %name,
            "Integration setup complete. Service will be notify.{}",
            name
        );
        Ok(name)
    }

    /// Unregister the entry's service and drop its table record. The entry
    /// itself stays persisted.
    pub fn unload_entry(&self, entry_id: &EntryId) -> Result<bool, HostError> {
        let name = self.registry.unregister(entry_id)?;
        let record = self.table.remove(entry_id)?;
        if let Some(ref name) = name {
            tracing::info!(entry_id = %entry_id, service = %name, "Unregistered notify service");
        }
        Ok(name.is_some() || record.is_some())
    }

    pub fn reload_entry(&self, entry_id: &EntryId) -> Result<(), HostError> {
        self.unload_entry(entry_id)?;
        self.setup_entry(entry_id)?;
        Ok(())
    }

    /// Forget an entry and unload it. The entry stays loaded if the store
    /// cannot be written.
    pub fn remove_entry(&self, entry_id: &EntryId) -> Result<(), HostError> {
        {
            let mut entries = self.write_entries()?;
            let mut updated = entries.clone();
            if updated.remove(entry_id).is_none() {
                return Err(HostError::EntryNotFound(entry_id.clone()));
            }
            self.save(&updated)?;
            *entries = updated;
        }
        self.unload_entry(entry_id)?;
        tracing::info!(entry_id = %entry_id, "Entry removed");
        Ok(())
    }

    /// Invoke a registered notification service by name.
    pub async fn call_service(&self, name: &str, call: ServiceCall) -> Result<(), HostError> {
        self.registry.call(name, &call).await
    }

    pub fn service_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn entry(&self, entry_id: &EntryId) -> Option<ConfigEntry> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(entry_id).cloned())
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.entries
            .read()
            .map(|entries| creation_order(entries.values().cloned()))
            .unwrap_or_default()
    }

    fn write_entries(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<EntryId, ConfigEntry>>, HostError> {
        self.entries
            .write()
            .map_err(|_| HostError::lock_poisoned("entries"))
    }

    fn save(&self, entries: &BTreeMap<EntryId, ConfigEntry>) -> Result<(), HostError> {
        self.store
            .save(&creation_order(entries.values().cloned()))?;
        Ok(())
    }
}

/// Sort by creation time, ties broken by id.
fn creation_order(entries: impl IntoIterator<Item = ConfigEntry>) -> Vec<ConfigEntry> {
    let mut entries: Vec<ConfigEntry> = entries.into_iter().collect();
    entries.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });
    entries
}
