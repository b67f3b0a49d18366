//! Push delivery for Pingie.
//!
//! Posts notification payloads to the push endpoint, and walks users through
//! validating credentials before they are committed.

pub mod client;
pub mod error;
pub mod sender;
pub mod wizard;

pub use client::{PushClient, PushResponse};
pub use error::{FormErrorCode, TransportError, ValidationError, WizardError};
pub use sender::{NotificationSender, NotifyService, SendOptions, SendOutcome};
pub use wizard::{
    Commit, CredentialValidator, FormField, FormInput, FormView, Wizard, WizardKind, WizardState,
};
