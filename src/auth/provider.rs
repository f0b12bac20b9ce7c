//! Identity provider client.
//!
//! `AuthProvider` is the seam the session store is built against;
//! `RestAuthClient` is the production implementation over the managed
//! identity provider's account endpoints. The client tracks the session it
//! issued and pushes changes to subscribers on its own schedule (sign-in,
//! sign-out, token refresh).

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use super::error::AuthError;

/// Base URL for the identity provider's account endpoints.
const AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Buffered session-change notifications per subscriber.
const SESSION_EVENTS_CAPACITY: usize = 16;

/// Maximum length for error response bodies in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Reference to a live provider session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRef {
    pub uid: String,
    pub token: String,
}

/// Operations the session store needs from the identity provider.
pub trait AuthProvider: Send + Sync + 'static {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SessionRef, AuthError>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SessionRef, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn send_password_reset(&self, email: &str)
        -> impl Future<Output = Result<(), AuthError>> + Send;

    fn send_email_verification(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn update_profile(
        &self,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// The session the provider currently holds, if any.
    fn current_session(&self) -> Option<SessionRef>;

    /// Subscribe to session-change notifications. `Some` carries the new
    /// session, `None` signals a provider-side sign-out.
    fn subscribe(&self) -> broadcast::Receiver<Option<SessionRef>>;
}

impl<P: AuthProvider> AuthProvider for std::sync::Arc<P> {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SessionRef, AuthError>> + Send {
        self.as_ref().sign_in(email, password)
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SessionRef, AuthError>> + Send {
        self.as_ref().sign_up(email, password)
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.as_ref().sign_out()
    }

    fn send_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.as_ref().send_password_reset(email)
    }

    fn send_email_verification(&self) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.as_ref().send_email_verification()
    }

    fn update_profile(
        &self,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.as_ref().update_profile(display_name, photo_url)
    }

    fn current_session(&self) -> Option<SessionRef> {
        self.as_ref().current_session()
    }

    fn subscribe(&self) -> broadcast::Receiver<Option<SessionRef>> {
        self.as_ref().subscribe()
    }
}

/// REST client for the identity provider.
pub struct RestAuthClient {
    client: Client,
    base_url: String,
    api_key: String,
    current: Mutex<Option<SessionRef>>,
    events: broadcast::Sender<Option<SessionRef>>,
}

impl RestAuthClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AuthError> {
        Self::with_base_url(api_key, AUTH_BASE_URL)
    }

    /// Point the client at a different endpoint (tests, staging).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let (events, _) = broadcast::channel(SESSION_EVENTS_CAPACITY);

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            current: Mutex::new(None),
            events,
        })
    }

    fn set_current(&self, session: Option<SessionRef>) {
        *self.current.lock().unwrap() = session.clone();
        // Nobody listening is fine
        let _ = self.events.send(session);
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        op: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = format!("{}/accounts:{}?key={}", self.base_url, op, self.api_key);
        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Self::error_from_body(status, &body))
        }
    }

    /// Translate an error body into a structured `AuthError`.
    ///
    /// The provider reports failures as `{"error": {"message": "WIRE_CODE"}}`;
    /// the wire code is normalized into the canonical `auth/...` code space.
    fn error_from_body(status: reqwest::StatusCode, body: &str) -> AuthError {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
            let message = envelope.error.message;
            return AuthError::provider(canonical_code(&message), message);
        }

        let truncated = if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!("{}... (truncated)", &body[..MAX_ERROR_BODY_LENGTH])
        };
        AuthError::InvalidResponse(format!("Status {}: {}", status, truncated))
    }
}

impl AuthProvider for RestAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionRef, AuthError> {
        let response: TokenResponse = self
            .post(
                "signInWithPassword",
                &PasswordCredentials {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        debug!(uid = %response.local_id, "Provider sign-in succeeded");
        let session = SessionRef {
            uid: response.local_id,
            token: response.id_token,
        };
        self.set_current(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionRef, AuthError> {
        let response: TokenResponse = self
            .post(
                "signUp",
                &PasswordCredentials {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        debug!(uid = %response.local_id, "Provider sign-up succeeded");
        let session = SessionRef {
            uid: response.local_id,
            token: response.id_token,
        };
        self.set_current(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Bearer sessions are stateless server-side; discarding the local
        // session and notifying subscribers is the whole operation.
        self.set_current(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &serde_json::json!({
                    "requestType": "PASSWORD_RESET",
                    "email": email,
                }),
            )
            .await?;
        Ok(())
    }

    async fn send_email_verification(&self) -> Result<(), AuthError> {
        let token = match self.current_session() {
            Some(s) => s.token,
            None => return Ok(()),
        };
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &serde_json::json!({
                    "requestType": "VERIFY_EMAIL",
                    "idToken": token,
                }),
            )
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<(), AuthError> {
        let token = match self.current_session() {
            Some(s) => s.token,
            None => return Ok(()),
        };
        let mut body = serde_json::json!({
            "idToken": token,
            "displayName": display_name,
        });
        if let Some(url) = photo_url {
            body["photoUrl"] = serde_json::Value::String(url.to_string());
        }
        let _: serde_json::Value = self.post("update", &body).await?;
        Ok(())
    }

    fn current_session(&self) -> Option<SessionRef> {
        self.current.lock().unwrap().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<Option<SessionRef>> {
        self.events.subscribe()
    }
}

/// Normalize a wire error code (`EMAIL_NOT_FOUND`, possibly with a trailing
/// `: detail` segment) into the canonical `auth/...` code space.
fn canonical_code(wire: &str) -> String {
    let head = wire
        .split([' ', ':'])
        .next()
        .unwrap_or(wire)
        .trim();

    match head {
        "INVALID_LOGIN_CREDENTIALS" => "auth/invalid-credential".to_string(),
        "INVALID_PASSWORD" => "auth/wrong-password".to_string(),
        "EMAIL_NOT_FOUND" => "auth/user-not-found".to_string(),
        "EMAIL_EXISTS" => "auth/email-already-in-use".to_string(),
        "WEAK_PASSWORD" => "auth/weak-password".to_string(),
        "INVALID_EMAIL" => "auth/invalid-email".to_string(),
        "USER_DISABLED" => "auth/user-disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests".to_string(),
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed".to_string(),
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" => {
            "auth/requires-recent-login".to_string()
        }
        "INVALID_OOB_CODE" | "EXPIRED_OOB_CODE" => "auth/invalid-action-code".to_string(),
        "UNAUTHORIZED_DOMAIN" => "auth/unauthorized-domain".to_string(),
        other => format!("auth/{}", other.to_lowercase().replace('_', "-")),
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(rename = "returnSecureToken")]
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "localId")]
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
