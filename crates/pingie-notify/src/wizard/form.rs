//! Form data exchanged with the user during a wizard run.

use std::fmt;

use pingie_core::{CredentialRecord, Secret};
use serde::Deserialize;

use crate::error::FormErrorCode;
use crate::wizard::WizardKind;

pub const FIELD_DEVICE_ID: &str = "device_id";
pub const FIELD_TOKEN: &str = "token";
pub const FIELD_NAME: &str = "name";
pub const FIELD_DEFAULT_TITLE: &str = "default_title";
pub const FIELD_DEFAULT_ICON_URL: &str = "default_icon_url";
pub const FIELD_DEFAULT_GROUP_TYPE: &str = "default_group_type";

/// Values submitted by the user.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FormInput {
    pub device_id: String,
    pub token: Secret,
    /// Custom entry title. Only offered during setup.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_title: Option<String>,
    #[serde(default)]
    pub default_icon_url: Option<String>,
    #[serde(default)]
    pub default_group_type: Option<String>,
}

impl FormInput {
    pub fn new(device_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            token: Secret::new(token),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_defaults(
        mut self,
        title: Option<&str>,
        icon_url: Option<&str>,
        group_type: Option<&str>,
    ) -> Self {
        self.default_title = title.map(str::to_string);
        self.default_icon_url = icon_url.map(str::to_string);
        self.default_group_type = group_type.map(str::to_string);
        self
    }

    /// Pre-fill from an existing record, for reconfiguration.
    pub fn from_record(record: &CredentialRecord) -> Self {
        let defaults = record.defaults();
        Self {
            device_id: record.device_id().to_string(),
            token: record.token().clone(),
            name: None,
            default_title: defaults.title.clone(),
            default_icon_url: defaults.icon_url.clone(),
            default_group_type: defaults.group_type.clone(),
        }
    }
}

/// One field as presented to the user.
#[derive(Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub required: bool,
    /// Render the value hidden. The value itself is kept as entered.
    pub masked: bool,
    pub value: Option<String>,
}

impl fmt::Debug for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.masked {
            self.value.as_ref().map(|_| "***".to_string())
        } else {
            self.value.clone()
        };
        f.debug_struct("FormField")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("masked", &self.masked)
            .field("value", &value)
            .finish()
    }
}

/// The form shown while the wizard awaits input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormView {
    pub step: WizardKind,
    pub fields: Vec<FormField>,
    /// Form-level error from the previous submission, if any.
    pub error: Option<FormErrorCode>,
}

impl FormView {
    /// Build the form for `step`, filled with `values`.
    pub fn new(step: WizardKind, values: &FormInput, error: Option<FormErrorCode>) -> Self {
        let mut fields = vec![
            FormField {
                name: FIELD_DEVICE_ID,
                required: true,
                masked: false,
                value: filled(&values.device_id),
            },
            FormField {
                name: FIELD_TOKEN,
                required: true,
                masked: true,
                value: filled(values.token.expose()),
            },
        ];
        if step == WizardKind::Setup {
            fields.push(optional(FIELD_NAME, values.name.as_deref()));
        }
        fields.push(optional(FIELD_DEFAULT_TITLE, values.default_title.as_deref()));
        fields.push(optional(
            FIELD_DEFAULT_ICON_URL,
            values.default_icon_url.as_deref(),
        ));
        fields.push(optional(
            FIELD_DEFAULT_GROUP_TYPE,
            values.default_group_type.as_deref(),
        ));
        Self {
            step,
            fields,
            error,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Current value of a field, if it has one.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|f| f.value.as_deref())
    }
}

fn filled(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn optional(name: &'static str, value: Option<&str>) -> FormField {
    FormField {
        name,
        required: false,
        masked: false,
        value: value.and_then(filled),
    }
}
