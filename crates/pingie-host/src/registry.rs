//! Service registry.
//!
//! Exposes one notification service per entry under a name derived from the
//! entry title, and dispatches service calls to it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use pingie_core::EntryId;
use pingie_notify::{NotifyService, SendOptions};
use serde::Deserialize;

use crate::error::HostError;

/// Data of one service invocation from the automation layer.
///
/// `data` is free-form; `icon_url` and `group_type` are read from it when
/// they are strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceCall {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ServiceCall {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn options(&self) -> SendOptions {
        let data_str = |key: &str| {
            self.data
                .as_ref()
                .and_then(|d| d.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        SendOptions {
            title: self.title.clone(),
            icon_url: data_str("icon_url"),
            group_type: data_str("group_type"),
        }
    }
}

/// Derive a service name from an entry title.
///
/// Lower-cased, spaces become underscores, and anything that is not an ASCII
/// letter, digit or underscore is dropped. An empty result falls back to a
/// name built from the entry id.
pub fn service_name_for(title: &str, entry_id: &EntryId) -> String {
    let name: String = title
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        fallback_name(entry_id)
    } else {
        name
    }
}

fn fallback_name(entry_id: &EntryId) -> String {
    format!("notify_api_{}", entry_id.short())
}

struct Registration {
    entry_id: EntryId,
    service: Arc<dyn NotifyService>,
}

#[derive(Default)]
struct Inner {
    services: HashMap<String, Registration>,
    names: HashMap<EntryId, String>,
}

/// Name -> service map, with the name each entry registered under.
#[derive(Default)]
pub struct ServiceRegistry {
    inner: RwLock<Inner>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` for `entry_id` under a name derived from `title`.
    ///
    /// If another entry already holds that name, the id-based fallback name
    /// is used instead. Returns the name actually registered.
    pub fn register(
        &self,
        entry_id: &EntryId,
        title: &str,
        service: Arc<dyn NotifyService>,
    ) -> Result<String, HostError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| HostError::lock_poisoned("service registry"))?;

        if let Some(previous) = inner.names.remove(entry_id) {
            inner.services.remove(&previous);
        }

        let mut name = service_name_for(title, entry_id);
        if inner.services.contains_key(&name) {
            let fallback = fallback_name(entry_id);
            tracing::warn!(
                service = %name,
                fallback = %fallback,
                "Service name taken by another entry, using fallback"
            );
            name = fallback;
        }
        if inner.services.contains_key(&name) {
            return Err(HostError::ServiceExists(name));
        }

        inner.services.insert(
            name.clone(),
            Registration {
                entry_id: entry_id.clone(),
                service,
            },
        );
        inner.names.insert(entry_id.clone(), name.clone());
        Ok(name)
    }

    /// Remove the service registered for `entry_id`, returning its name.
    pub fn unregister(&self, entry_id: &EntryId) -> Result<Option<String>, HostError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| HostError::lock_poisoned("service registry"))?;
        let name = inner.names.remove(entry_id);
        if let Some(ref name) = name {
            inner.services.remove(name);
        }
        Ok(name)
    }

    pub fn name_for(&self, entry_id: &EntryId) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.names.get(entry_id).cloned())
    }

    pub fn entry_for(&self, name: &str) -> Option<EntryId> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.services.get(name).map(|r| r.entry_id.clone()))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .read()
            .map(|inner| inner.services.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Invoke the named service.
    pub async fn call(&self, name: &str, call: &ServiceCall) -> Result<(), HostError> {
        let service = {
            let inner = self
                .inner
                .read()
                .map_err(|_| HostError::lock_poisoned("service registry"))?;
            inner
                .services
                .get(name)
                .map(|r| Arc::clone(&r.service))
                .ok_or_else(|| HostError::ServiceNotFound(name.to_string()))?
        };
        service.send_message(call.message(), &call.options()).await;
        Ok(())
    }
}
