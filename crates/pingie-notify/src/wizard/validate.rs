//! Remote credential validation.
//!
//! A credential pair is accepted only if the push endpoint answers a test
//! notification with HTTP 200.

use async_trait::async_trait;
use pingie_core::{CredentialRecord, NotificationPayload, PresentationDefaults, Secret};

use crate::client::PushClient;
use crate::error::ValidationError;
use crate::wizard::form::FormInput;
use crate::wizard::Commit;

pub const TEST_MESSAGE: &str = "✅ Notify Alerts integration successfully configured!";
pub const TEST_TITLE: &str = "Integration Test";

/// Checks a device id and token against the remote service.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn check(&self, device_id: &str, token: &Secret) -> Result<(), ValidationError>;
}

#[async_trait]
impl CredentialValidator for PushClient {
    async fn check(&self, device_id: &str, token: &Secret) -> Result<(), ValidationError> {
        let payload = NotificationPayload::new(TEST_MESSAGE).with_title(Some(TEST_TITLE));
        let response = self.post(device_id, token, &payload).await?;
        classify_status(response.status)
    }
}

/// Map an HTTP status from the test call onto a validation result.
pub fn classify_status(status: u16) -> Result<(), ValidationError> {
    match status {
        200 => Ok(()),
        401 | 403 => Err(ValidationError::InvalidAuth(format!(
            "credentials rejected (status {})",
            status
        ))),
        404 => Err(ValidationError::InvalidAuth(
            "Device or group ID not found".into(),
        )),
        other => Err(ValidationError::CannotConnect(format!(
            "API returned status {}",
            other
        ))),
    }
}

/// Title for a new entry: the custom name if it has content, otherwise one
/// derived from the device id.
pub fn entry_title(custom_name: Option<&str>, device_id: &str) -> String {
    match custom_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Notify! Alert ({})", device_id.to_uppercase()),
    }
}

/// Validate submitted form values and build the record to commit.
pub async fn validate<V>(validator: &V, input: &FormInput) -> Result<Commit, ValidationError>
where
    V: CredentialValidator + ?Sized,
{
    let defaults = PresentationDefaults::from_raw(
        input.default_title.as_deref(),
        input.default_icon_url.as_deref(),
        input.default_group_type.as_deref(),
    );
    let record = CredentialRecord::new(
        input.device_id.as_str(),
        input.token.expose(),
        defaults,
    )
    .map_err(|e| ValidationError::InvalidAuth(e.to_string()))?;

    validator.check(record.device_id(), record.token()).await?;

    let title = entry_title(input.name.as_deref(), record.device_id());
    Ok(Commit { record, title })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormErrorCode;
    use pingie_core::config::ApiConfig;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PushClient {
        PushClient::new(&ApiConfig {
            base_url: server.uri(),
            timeout_secs: 10,
        })
        .unwrap()
    }

    async fn server_with_status(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(200).is_ok());
        for status in [401, 403, 404] {
            assert_eq!(
                classify_status(status).unwrap_err().code(),
                FormErrorCode::InvalidAuth
            );
        }
        for status in [201, 204, 400, 429, 500, 502] {
            let err = classify_status(status).unwrap_err();
            assert_eq!(err.code(), FormErrorCode::CannotConnect);
            assert!(err.to_string().contains(&status.to_string()));
        }
    }

    #[test]
    fn test_entry_title_uses_custom_name_verbatim() {
        assert_eq!(entry_title(Some("Dan's Phone!"), "abc123"), "Dan's Phone!");
    }

    #[test]
    fn test_entry_title_synthesized() {
        assert_eq!(entry_title(None, "abc123"), "Notify! Alert (ABC123)");
        assert_eq!(entry_title(Some(""), "abc123"), "Notify! Alert (ABC123)");
        assert_eq!(entry_title(Some("   "), "abc123"), "Notify! Alert (ABC123)");
    }

    #[tokio::test]
    async fn test_validate_success_sends_test_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/abc123"))
            .and(query_param("token", "tok"))
            .and(body_json(serde_json::json!({"text": TEST_MESSAGE, "title": TEST_TITLE})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let input = FormInput::new("abc123", "tok").with_defaults(Some("Home"), None, Some(""));
        let commit = validate(&client_for(&server), &input).await.unwrap();

        assert_eq!(commit.title, "Notify! Alert (ABC123)");
        assert_eq!(commit.record.device_id(), "abc123");
        assert_eq!(commit.record.token().expose(), "tok");
        assert_eq!(commit.record.display_title(), Some("Home"));
        assert!(commit.record.defaults().group_type.is_none());
    }

    #[tokio::test]
    async fn test_validate_rejected_credentials_are_invalid_auth() {
        for status in [401, 403, 404] {
            let server = server_with_status(status).await;
            let err = validate(&client_for(&server), &FormInput::new("abc123", "bad"))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidAuth(_)),
                "status {} gave {:?}",
                status,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_validate_server_error_is_cannot_connect() {
        let server = server_with_status(500).await;
        let err = validate(&client_for(&server), &FormInput::new("abc123", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::CannotConnect(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_validate_timeout_is_cannot_connect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        let client = client_for(&server).with_timeout(Duration::from_millis(200));

        let err = validate(&client, &FormInput::new("abc123", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::CannotConnect(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_validate_connection_refused_is_cannot_connect() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = PushClient::new(&ApiConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            timeout_secs: 10,
        })
        .unwrap();

        let err = validate(&client, &FormInput::new("abc123", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::CannotConnect(_)));
        assert!(err.to_string().contains("Could not connect"));
    }

    #[tokio::test]
    async fn test_validate_blank_fields_skip_remote_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = validate(&client_for(&server), &FormInput::new("  ", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAuth(_)));
    }
}
