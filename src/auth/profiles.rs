//! Profile document store.
//!
//! Provider-issued profiles live in a user document store keyed by uid.
//! `RestProfileStore` talks to the hosted document API; `MemoryProfileStore`
//! backs tests and offline frontends.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::AuthError;
use crate::models::AccountProfile;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Document store holding one profile per user id.
pub trait ProfileStore: Send + Sync + 'static {
    fn save(&self, profile: &AccountProfile) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn get(
        &self,
        uid: &str,
    ) -> impl Future<Output = Result<Option<AccountProfile>, AuthError>> + Send;
}

impl<S: ProfileStore> ProfileStore for std::sync::Arc<S> {
    fn save(&self, profile: &AccountProfile) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.as_ref().save(profile)
    }

    fn get(
        &self,
        uid: &str,
    ) -> impl Future<Output = Result<Option<AccountProfile>, AuthError>> + Send {
        self.as_ref().get(uid)
    }
}

/// REST client for the hosted profile document API.
pub struct RestProfileStore {
    client: Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl RestProfileStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: Mutex::new(None),
        })
    }

    /// Set the bearer token for authenticated requests.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }

    fn document_url(&self, uid: &str) -> String {
        format!("{}/users/{}", self.base_url, uid)
    }

    fn bearer(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl ProfileStore for RestProfileStore {
    async fn save(&self, profile: &AccountProfile) -> Result<(), AuthError> {
        let mut request = self.client.post(self.document_url(&profile.uid)).json(profile);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::InvalidResponse(format!(
                "Profile save failed with status {}: {}",
                status, body
            )));
        }
        debug!(uid = %profile.uid, "Profile document saved");
        Ok(())
    }

    async fn get(&self, uid: &str) -> Result<Option<AccountProfile>, AuthError> {
        let mut request = self.client.get(self.document_url(uid));
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::InvalidResponse(format!(
                "Profile fetch failed with status {}: {}",
                status, body
            )));
        }

        Ok(Some(response.json().await?))
    }
}

/// In-memory store for tests and offline frontends.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, AccountProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn save(&self, profile: &AccountProfile) -> Result<(), AuthError> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    async fn get(&self, uid: &str) -> Result<Option<AccountProfile>, AuthError> {
        Ok(self.profiles.lock().unwrap().get(uid).cloned())
    }
}
