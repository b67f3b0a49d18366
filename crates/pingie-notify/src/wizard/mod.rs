//! Credential wizard.
//!
//! One state machine serves both initial setup and reconfiguration:
//! - AwaitingInput -> AwaitingInput (submit failed, form re-shown with error)
//! - AwaitingInput -> Committed (submit validated)
//!
//! Committed is terminal. Abandoning a wizard needs no cleanup because nothing
//! is persisted until the caller takes the commit.

pub mod form;
pub mod validate;

use std::fmt;

use pingie_core::CredentialRecord;

use crate::error::{ValidationError, WizardError};

pub use form::{FormField, FormInput, FormView};
pub use validate::{classify_status, entry_title, validate, CredentialValidator};

/// Which flow the wizard is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardKind {
    Setup,
    Reconfigure,
}

impl fmt::Display for WizardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardKind::Setup => write!(f, "setup"),
            WizardKind::Reconfigure => write!(f, "reconfigure"),
        }
    }
}

/// A validated record, ready for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub record: CredentialRecord,
    /// Entry title derived from the custom name or the device id.
    pub title: String,
}

/// Current wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    AwaitingInput(FormView),
    Committed(Commit),
}

impl WizardState {
    pub fn is_committed(&self) -> bool {
        matches!(self, WizardState::Committed(_))
    }
}

/// Collects and validates credentials before they are committed.
pub struct Wizard<V> {
    kind: WizardKind,
    validator: V,
    state: WizardState,
}

impl<V: CredentialValidator> Wizard<V> {
    /// Start initial setup with an empty form.
    pub fn begin_setup(validator: V) -> Self {
        Self {
            kind: WizardKind::Setup,
            validator,
            state: WizardState::AwaitingInput(FormView::new(
                WizardKind::Setup,
                &FormInput::default(),
                None,
            )),
        }
    }

    /// Start reconfiguration with the form pre-filled from `existing`.
    pub fn begin_reconfigure(validator: V, existing: &CredentialRecord) -> Self {
        Self {
            kind: WizardKind::Reconfigure,
            validator,
            state: WizardState::AwaitingInput(FormView::new(
                WizardKind::Reconfigure,
                &FormInput::from_record(existing),
                None,
            )),
        }
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Validate `input` and advance.
    ///
    /// On failure the form is re-presented with the submitted values and a
    /// single form-level error code.
    pub async fn submit(&mut self, input: FormInput) -> Result<&WizardState, WizardError> {
        if self.state.is_committed() {
            return Err(WizardError::AlreadyCommitted);
        }

        self.state = match validate::validate(&self.validator, &input).await {
            Ok(commit) => {
                tracing::info!(
                    wizard = %self.kind,
                    device_id = %commit.record.device_id(),
                    title = %commit.title,
                    "Credentials validated"
                );
                WizardState::Committed(commit)
            }
            Err(err) => {
                match &err {
                    ValidationError::Unknown(detail) => tracing::error!(
                        wizard = %self.kind,
                        error = %detail,
                        "Unexpected exception during validation"
                    ),
                    other => tracing::warn!(
                        wizard = %self.kind,
                        error = %other,
                        "Credential validation failed"
                    ),
                }
                WizardState::AwaitingInput(FormView::new(self.kind, &input, Some(err.code())))
            }
        };

        Ok(&self.state)
    }

    /// Take the commit out of a finished wizard.
    pub fn into_commit(self) -> Option<Commit> {
        match self.state {
            WizardState::Committed(commit) => Some(commit),
            WizardState::AwaitingInput(_) => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormErrorCode;
    use async_trait::async_trait;
    use pingie_core::{PresentationDefaults, Secret};
    use std::sync::Mutex;

    /// Validator that replays scripted outcomes and records what it saw.
    struct ScriptedValidator {
        outcomes: Mutex<Vec<Result<(), ValidationError>>>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedValidator {
        fn new(mut outcomes: Vec<Result<(), ValidationError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CredentialValidator for ScriptedValidator {
        async fn check(&self, device_id: &str, token: &Secret) -> Result<(), ValidationError> {
            self.seen
                .lock()
                .unwrap()
                .push((device_id.to_string(), token.expose().to_string()));
            self.outcomes.lock().unwrap().pop().unwrap_or(Ok(()))
        }
    }

    fn existing() -> CredentialRecord {
        CredentialRecord::new(
            "old-device",
            "old-token",
            PresentationDefaults::from_raw(Some("Old"), None, None),
        )
        .unwrap()
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(WizardKind::Setup.to_string(), "setup");
        assert_eq!(WizardKind::Reconfigure.to_string(), "reconfigure");
    }

    #[test]
    fn test_setup_starts_with_empty_form() {
        let wizard = Wizard::begin_setup(ScriptedValidator::new(vec![]));
        assert_eq!(wizard.kind(), WizardKind::Setup);
        match wizard.state() {
            WizardState::AwaitingInput(view) => {
                assert_eq!(view.step, WizardKind::Setup);
                assert!(view.error.is_none());
                assert!(view.value("device_id").is_none());
            }
            other => panic!("expected AwaitingInput, got {:?}", other),
        }
    }

    #[test]
    fn test_reconfigure_starts_prefilled() {
        let wizard = Wizard::begin_reconfigure(ScriptedValidator::new(vec![]), &existing());
        match wizard.state() {
            WizardState::AwaitingInput(view) => {
                assert_eq!(view.value("device_id"), Some("old-device"));
                assert_eq!(view.value("token"), Some("old-token"));
                assert_eq!(view.value("default_title"), Some("Old"));
            }
            other => panic!("expected AwaitingInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_success_commits() {
        let mut wizard = Wizard::begin_setup(ScriptedValidator::new(vec![Ok(())]));
        let state = wizard
            .submit(FormInput::new("abc123", "tok").with_name("Dan's Phone!"))
            .await
            .unwrap();
        assert!(state.is_committed());

        let commit = wizard.into_commit().unwrap();
        assert_eq!(commit.title, "Dan's Phone!");
        assert_eq!(commit.record.device_id(), "abc123");
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_values_and_sets_code() {
        let validator = ScriptedValidator::new(vec![Err(ValidationError::InvalidAuth(
            "nope".into(),
        ))]);
        let mut wizard = Wizard::begin_setup(validator);
        let input = FormInput::new("abc123", "bad").with_defaults(Some("T"), None, None);

        match wizard.submit(input).await.unwrap() {
            WizardState::AwaitingInput(view) => {
                assert_eq!(view.error, Some(FormErrorCode::InvalidAuth));
                assert_eq!(view.value("device_id"), Some("abc123"));
                assert_eq!(view.value("token"), Some("bad"));
                assert_eq!(view.value("default_title"), Some("T"));
            }
            other => panic!("expected AwaitingInput, got {:?}", other),
        }
        assert!(wizard.into_commit().is_none());
    }

    #[tokio::test]
    async fn test_retry_after_failure_commits() {
        let validator = ScriptedValidator::new(vec![
            Err(ValidationError::CannotConnect("timed out".into())),
            Err(ValidationError::Unknown("worker panicked".into())),
            Ok(()),
        ]);
        let mut wizard = Wizard::begin_setup(validator);

        let codes = [Some(FormErrorCode::CannotConnect), Some(FormErrorCode::Unknown)];
        for expected in codes {
            match wizard.submit(FormInput::new("abc123", "tok")).await.unwrap() {
                WizardState::AwaitingInput(view) => assert_eq!(view.error, expected),
                other => panic!("expected AwaitingInput, got {:?}", other),
            }
        }

        let state = wizard.submit(FormInput::new("abc123", "tok")).await.unwrap();
        assert!(state.is_committed());
    }

    #[tokio::test]
    async fn test_submit_after_commit_is_rejected() {
        let mut wizard = Wizard::begin_setup(ScriptedValidator::new(vec![Ok(())]));
        wizard.submit(FormInput::new("abc123", "tok")).await.unwrap();

        let err = wizard
            .submit(FormInput::new("other", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::AlreadyCommitted));
    }

    #[tokio::test]
    async fn test_reconfigure_replaces_whole_record() {
        let mut wizard = Wizard::begin_reconfigure(ScriptedValidator::new(vec![Ok(())]), &existing());
        wizard
            .submit(FormInput::new("new-device", "new-token"))
            .await
            .unwrap();

        let commit = wizard.into_commit().unwrap();
        assert_eq!(commit.record.device_id(), "new-device");
        assert_eq!(commit.record.token().expose(), "new-token");
        // Defaults left empty in the submission are cleared, not carried over.
        assert!(commit.record.defaults().is_empty());
    }

    #[tokio::test]
    async fn test_validator_sees_submitted_credentials() {
        let validator = ScriptedValidator::new(vec![Ok(())]);
        let mut wizard = Wizard::begin_setup(validator);
        wizard.submit(FormInput::new("abc123", "tok")).await.unwrap();

        let seen = wizard.validator.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("abc123".to_string(), "tok".to_string())]);
    }
}
