use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PingieError, Result};

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque identifier of one configured entry.
///
/// Assigned by the host when a credential record is committed and used only
/// as a lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh id (32 lowercase hex characters).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first eight characters, used when synthesizing names.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A secret string that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Optional presentation values applied when a send call leaves them out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
}

impl PresentationDefaults {
    /// Build from raw form values, dropping blank ones.
    pub fn from_raw(title: Option<&str>, icon_url: Option<&str>, group_type: Option<&str>) -> Self {
        Self {
            title: non_blank(title),
            icon_url: non_blank(icon_url),
            group_type: non_blank(group_type),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.icon_url.is_none() && self.group_type.is_none()
    }
}

/// Credentials for one device or group, plus its presentation defaults.
///
/// Invariant: `device_id` and `token` are both non-empty. Records are only
/// ever replaced whole, never patched field by field.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCredentialRecord")]
pub struct CredentialRecord {
    device_id: String,
    token: Secret,
    defaults: PresentationDefaults,
}

impl CredentialRecord {
    pub fn new(
        device_id: impl Into<String>,
        token: impl Into<String>,
        defaults: PresentationDefaults,
    ) -> Result<Self> {
        let device_id = device_id.into();
        let token = token.into();
        if device_id.trim().is_empty() {
            return Err(PingieError::InvalidRecord("device_id must not be empty".into()));
        }
        if token.is_empty() {
            return Err(PingieError::InvalidRecord("token must not be empty".into()));
        }
        Ok(Self {
            device_id,
            token: Secret::new(token),
            defaults,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn token(&self) -> &Secret {
        &self.token
    }

    pub fn defaults(&self) -> &PresentationDefaults {
        &self.defaults
    }

    /// The default notification title, if one is configured.
    pub fn display_title(&self) -> Option<&str> {
        self.defaults.title.as_deref()
    }
}

#[derive(Deserialize)]
struct RawCredentialRecord {
    device_id: String,
    token: String,
    #[serde(default)]
    defaults: PresentationDefaults,
}

impl TryFrom<RawCredentialRecord> for CredentialRecord {
    type Error = PingieError;

    fn try_from(raw: RawCredentialRecord) -> Result<Self> {
        CredentialRecord::new(raw.device_id, raw.token, raw.defaults)
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("device_id", &self.device_id)
            .field("token", &self.token)
            .field("defaults", &self.defaults)
            .finish()
    }
}

// =============================================================================
// Wire payload
// =============================================================================

/// JSON body posted to the push endpoint.
///
/// `text` is always present. Optional keys are omitted entirely when unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
}

impl NotificationPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
            icon_url: None,
            group_type: None,
        }
    }

    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = non_blank(title);
        self
    }

    pub fn with_icon_url(mut self, icon_url: Option<&str>) -> Self {
        self.icon_url = non_blank(icon_url);
        self
    }

    pub fn with_group_type(mut self, group_type: Option<&str>) -> Self {
        self.group_type = non_blank(group_type);
        self
    }
}

/// `Some(owned)` for a value with visible content, `None` for absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}

// =============================================================================
// Tests
// =============================================================================
