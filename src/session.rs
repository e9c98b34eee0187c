//! Login validation and the sign-in flow.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Role, SessionUser};
use crate::store::{AuthStore, StoreError};

/// The backend issues no tokens, so every session carries this marker.
pub const SESSION_TOKEN: &str = "server-session";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A single form-field problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    EmailRequired,
    EmailInvalid,
    PasswordRequired,
    PasswordTooShort,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmailRequired => "Email is required",
            Self::EmailInvalid => "Enter a valid email",
            Self::PasswordRequired => "Password is required",
            Self::PasswordTooShort => "Password must be at least 6 characters",
        })
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{}", join_fields(.0))]
    Validation(Vec<FieldError>),
    #[error("Login failed: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        Err(FieldError::EmailRequired)
    } else if !EMAIL_PATTERN.is_match(email) {
        Err(FieldError::EmailInvalid)
    } else {
        Ok(())
    }
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        Err(FieldError::PasswordRequired)
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Err(FieldError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Validate both fields, reporting every problem at once.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), SessionError> {
    let errors: Vec<FieldError> = [validate_email(email), validate_password(password)]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SessionError::Validation(errors))
    }
}

/// Validate, authenticate against the backend and open a session.
///
/// Nothing is sent when validation fails. Every authenticated user is
/// granted the admin role.
pub async fn login(
    api: &ApiClient,
    auth: &mut AuthStore,
    email: &str,
    password: &str,
) -> Result<SessionUser, SessionError> {
    validate_credentials(email, password)?;

    let api_user = api.authenticate(email, password).await.map_err(|e| {
        warn!("Authentication failed for {}: {}", email, e);
        e
    })?;

    let user = SessionUser {
        id: api_user.id,
        name: api_user.name,
        email: api_user.email,
        role: Role::Admin,
        avatar: None,
    };
    auth.login(user.clone(), SESSION_TOKEN.to_string())?;
    info!("Logged in as {}", user.email);
    Ok(user)
}

/// Close the current session.
pub fn logout(auth: &mut AuthStore) -> Result<(), SessionError> {
    auth.logout()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(""), Err(FieldError::EmailRequired));
        assert_eq!(validate_email("asha"), Err(FieldError::EmailInvalid));
        assert_eq!(validate_email("asha@acme"), Err(FieldError::EmailInvalid));
        assert_eq!(validate_email("as ha@acme.in"), Err(FieldError::EmailInvalid));
        assert!(validate_email("asha@acme.in").is_ok());
    }

    #[test]
    fn test_validate_password() {
        assert_eq!(validate_password(""), Err(FieldError::PasswordRequired));
        assert_eq!(validate_password("12345"), Err(FieldError::PasswordTooShort));
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_validate_credentials_collects_both() {
        match validate_credentials("", "1") {
            Err(SessionError::Validation(errs)) => {
                assert_eq!(errs, vec![FieldError::EmailRequired, FieldError::PasswordTooShort]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_success_grants_admin() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_success": true,
                "user": {"id": 12, "name": "Asha", "email": "asha@acme.in"}
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let mut auth = AuthStore::in_memory();
        let user = login(&api, &mut auth, "asha@acme.in", "secret1").await.unwrap();

        assert_eq!(user.id, "12");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(auth.token(), Some(SESSION_TOKEN));
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_store_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"is_success": false})),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let mut auth = AuthStore::in_memory();
        let err = login(&api, &mut auth, "asha@acme.in", "secret1")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Invalid email or password"));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let mut auth = AuthStore::in_memory();
        let err = login(&api, &mut auth, "bad", "x").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }
}
