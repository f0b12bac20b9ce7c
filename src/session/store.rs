//! The session store.
//!
//! Three input sources race for the session: explicit user actions, the
//! identity provider's session-change notifications, and the startup status
//! check. The store serializes all of them into one event inbox consumed by a
//! single task, which owns the `Session` record and publishes read-only
//! snapshots through a watch channel. Which completion lands last decides the
//! final state; individual updates are never interleaved.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::error::AuthError;
use crate::auth::profiles::ProfileStore;
use crate::auth::provider::{AuthProvider, SessionRef};
use crate::auth::vault::{CredentialStore, PROFILE_KEY, TOKEN_KEY};
use crate::models::{AccountProfile, RegistrationData, SocialProfile, UserProfile};

use super::router::{container_key, Route};

/// Buffer size for the session event inbox.
const INBOX_BUFFER_SIZE: usize = 32;

// ============================================================================
// Session snapshot
// ============================================================================

/// The process-wide authentication/authorization state.
///
/// Snapshots are cheap clones; screens read them and dispatch actions, never
/// mutating fields directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Session {
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_onboarded: bool,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// The navigation subtree this session selects.
    pub fn route(&self) -> Route {
        Route::for_session(self.is_authenticated, self.is_onboarded)
    }

    /// Remount key for the navigation container.
    pub fn container_key(&self) -> &'static str {
        container_key(self.is_authenticated)
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ActionStarted => {
                self.is_loading = true;
                self.error = None;
            }
            SessionEvent::SignedIn { token, user } => {
                self.is_loading = false;
                self.is_authenticated = true;
                self.token = Some(token);
                self.user = user;
                self.error = None;
            }
            SessionEvent::ActionFailed { message } => {
                self.is_loading = false;
                self.error = Some(message);
            }
            SessionEvent::ActionSettled => {
                self.is_loading = false;
            }
            SessionEvent::SignedOut => {
                self.token = None;
                self.is_authenticated = false;
                self.user = None;
                self.error = None;
                self.is_loading = false;
            }
            SessionEvent::StatusChecked { token, user } => {
                self.is_loading = false;
                self.is_authenticated = token.is_some();
                self.token = token;
                self.user = user;
            }
            SessionEvent::TokenIssued { token } => {
                self.token = Some(token);
                self.is_authenticated = true;
                self.is_onboarded = true;
                self.error = None;
            }
            SessionEvent::SocialSignedIn { profile } => {
                self.is_authenticated = true;
                self.user = Some(UserProfile::Social(profile));
                self.error = None;
            }
            SessionEvent::OnboardingCompleted => {
                self.is_onboarded = true;
            }
            SessionEvent::OnboardingReset => {
                self.is_onboarded = false;
            }
            SessionEvent::ErrorChanged { message } => {
                self.error = message;
            }
        }
    }
}

// ============================================================================
// Session events
// ============================================================================

/// State changes applied to the session, one at a time, in arrival order.
#[derive(Debug)]
enum SessionEvent {
    /// An async action went in flight; disables duplicate submissions.
    ActionStarted,
    /// Login or registration settled successfully.
    SignedIn {
        token: String,
        user: Option<UserProfile>,
    },
    /// An async action settled with a user-facing failure message.
    ActionFailed { message: String },
    /// An async action settled without touching the auth gates.
    ActionSettled,
    /// Explicit logout; clears unconditionally.
    SignedOut,
    /// Result of a startup or listener-triggered status check.
    StatusChecked {
        token: Option<String>,
        user: Option<UserProfile>,
    },
    /// A freshly issued token was injected without a provider round-trip.
    TokenIssued { token: String },
    /// Social sign-in; the OAuth exchange happened upstream.
    SocialSignedIn { profile: SocialProfile },
    OnboardingCompleted,
    OnboardingReset,
    ErrorChanged { message: Option<String> },
}

// ============================================================================
// Store
// ============================================================================

/// Owns the session and serializes every mutation to it.
///
/// Generic over the three collaborator seams: the identity provider, the
/// credential vault, and the profile document store.
pub struct SessionStore<P, C, D> {
    inner: Arc<Inner<P, C, D>>,
    inbox: JoinHandle<()>,
    listener: JoinHandle<()>,
}

struct Inner<P, C, D> {
    provider: P,
    vault: C,
    profiles: D,
    events: mpsc::Sender<SessionEvent>,
    snapshot: watch::Receiver<Session>,
}

impl<P, C, D> SessionStore<P, C, D>
where
    P: AuthProvider,
    C: CredentialStore,
    D: ProfileStore,
{
    pub fn new(provider: P, vault: C, profiles: D) -> Self {
        let (events_tx, mut events_rx) = mpsc::channel(INBOX_BUFFER_SIZE);
        let (snapshot_tx, snapshot_rx) = watch::channel(Session::default());

        // The single consumer; every mutation flows through here in arrival
        // order.
        let inbox = tokio::spawn(async move {
            let mut session = Session::default();
            while let Some(event) = events_rx.recv().await {
                debug!(?event, "Applying session event");
                session.apply(event);
                if snapshot_tx.send(session.clone()).is_err() {
                    break;
                }
            }
        });

        let provider_events = provider.subscribe();
        let inner = Arc::new(Inner {
            provider,
            vault,
            profiles,
            events: events_tx,
            snapshot: snapshot_rx,
        });

        let listener = tokio::spawn(Self::run_listener(Arc::clone(&inner), provider_events));

        Self {
            inner,
            inbox,
            listener,
        }
    }

    /// Consume provider session-change notifications for the lifetime of the
    /// store.
    async fn run_listener(
        inner: Arc<Inner<P, C, D>>,
        mut events: broadcast::Receiver<Option<SessionRef>>,
    ) {
        loop {
            match events.recv().await {
                Ok(Some(_)) => {
                    // Precondition: a session that already holds a token must
                    // not be touched. A stale or duplicate notification
                    // arriving right after a manual login would otherwise
                    // overwrite the fresher state.
                    if inner.snapshot.borrow().token.is_some() {
                        debug!("Ignoring provider session event; session already holds a token");
                        continue;
                    }
                    inner.run_status_check().await;
                }
                Ok(None) => {
                    // Sign-in can be discovered passively; sign-out only
                    // happens through the explicit action.
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Provider session events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read-only snapshot of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.snapshot.borrow().clone()
    }

    /// Watch the session; the receiver yields a fresh snapshot per change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.snapshot.clone()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.inner.send(SessionEvent::ActionStarted).await;
        match self.login_flow(email, password).await {
            Ok((token, user)) => {
                self.inner.send(SessionEvent::SignedIn { token, user }).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.inner
                    .send(SessionEvent::ActionFailed {
                        message: e.user_message(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn login_flow(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Option<UserProfile>), AuthError> {
        let session = self.inner.provider.sign_in(email, password).await?;

        let user = match self.inner.profiles.get(&session.uid).await {
            Ok(profile) => profile.map(UserProfile::Account),
            Err(e) => {
                warn!(error = %e, "Profile fetch failed after sign-in");
                None
            }
        };

        self.inner.persist(&session.token, user.as_ref());
        Ok((session.token, user))
    }

    /// Create an account, send the verification email, and store the profile
    /// stub. Success authenticates but does not complete onboarding.
    pub async fn register(&self, data: &RegistrationData) -> Result<(), AuthError> {
        self.inner.send(SessionEvent::ActionStarted).await;
        match self.register_flow(data).await {
            Ok((token, user)) => {
                self.inner.send(SessionEvent::SignedIn { token, user }).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.inner
                    .send(SessionEvent::ActionFailed {
                        message: e.user_message(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn register_flow(
        &self,
        data: &RegistrationData,
    ) -> Result<(String, Option<UserProfile>), AuthError> {
        let session = self
            .inner
            .provider
            .sign_up(&data.email, &data.password)
            .await?;

        if let Err(e) = self.inner.provider.send_email_verification().await {
            warn!(error = %e, "Verification email failed to send");
        }

        let now = Utc::now();
        let profile = AccountProfile {
            uid: session.uid.clone(),
            email: data.email.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            mobile_number: data.mobile_number.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner.profiles.save(&profile).await?;

        let user = UserProfile::Account(profile);
        self.inner.persist(&session.token, Some(&user));
        Ok((session.token, Some(user)))
    }

    /// Sign out and clear local state.
    ///
    /// Local state is cleared even when the provider call fails; the error is
    /// still returned for UI feedback. Safe to call in any state.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.inner.provider.sign_out().await;
        if let Err(e) = &result {
            warn!(error = %e, "Provider sign-out failed; clearing local session anyway");
        }

        if let Err(e) = self.inner.vault.remove(&[TOKEN_KEY, PROFILE_KEY]) {
            warn!(error = %e, "Failed to clear credential vault");
        }

        self.inner.send(SessionEvent::SignedOut).await;
        result
    }

    /// Fire-and-report; never touches the auth gates.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.inner.send(SessionEvent::ActionStarted).await;
        match self.inner.provider.send_password_reset(email).await {
            Ok(()) => {
                self.inner.send(SessionEvent::ActionSettled).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Password reset failed");
                self.inner
                    .send(SessionEvent::ActionFailed {
                        message: e.user_message(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    /// Startup rehydration: recover a session that survived a restart. Runs
    /// once at mount; the listener re-runs it when the provider discovers a
    /// sign-in first.
    pub async fn check_status(&self) {
        self.inner.run_status_check().await;
    }

    /// Social sign-in; the OAuth exchange happened upstream, so there is no
    /// loading phase.
    pub async fn google_login(&self, profile: SocialProfile) {
        self.inner
            .send(SessionEvent::SocialSignedIn { profile })
            .await;
    }

    /// Accept a freshly issued token without a provider round-trip.
    pub async fn manual_login(&self, token: String) {
        self.inner.send(SessionEvent::TokenIssued { token }).await;
    }

    pub async fn complete_onboarding(&self) {
        self.inner.send(SessionEvent::OnboardingCompleted).await;
    }

    /// Escape hatch from the authentication flow back to onboarding
    /// ("use a different account").
    pub async fn reset_onboarding(&self) {
        self.inner.send(SessionEvent::OnboardingReset).await;
    }

    pub async fn set_error(&self, message: impl Into<String>) {
        self.inner
            .send(SessionEvent::ErrorChanged {
                message: Some(message.into()),
            })
            .await;
    }

    pub async fn clear_error(&self) {
        self.inner
            .send(SessionEvent::ErrorChanged { message: None })
            .await;
    }
}

impl<P, C, D> Inner<P, C, D>
where
    P: AuthProvider,
    C: CredentialStore,
    D: ProfileStore,
{
    async fn send(&self, event: SessionEvent) {
        if self.events.send(event).await.is_err() {
            // Store dropped mid-action; the late update is discarded.
            debug!("Session inbox closed; dropping event");
        }
    }

    async fn run_status_check(&self) {
        self.send(SessionEvent::ActionStarted).await;

        let current = self.provider.current_session();
        let stored_token = match self.vault.get(TOKEN_KEY) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        };

        if current.is_none() && stored_token.is_none() {
            self.send(SessionEvent::StatusChecked {
                token: None,
                user: None,
            })
            .await;
            return;
        }

        // The persisted token wins; fall back to the live session's token so
        // a provider-discovered sign-in can authenticate before anything was
        // persisted.
        let token = stored_token.or_else(|| current.as_ref().map(|s| s.token.clone()));
        let user = self.load_profile(current.as_ref()).await;
        self.send(SessionEvent::StatusChecked { token, user }).await;
    }

    /// Cached profile first, then the document store.
    async fn load_profile(&self, current: Option<&SessionRef>) -> Option<UserProfile> {
        match self.vault.get(PROFILE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(profile) => return Some(profile),
                Err(e) => warn!(error = %e, "Cached profile is unreadable"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read cached profile"),
        }

        let session = current?;
        match self.profiles.get(&session.uid).await {
            Ok(profile) => profile.map(UserProfile::Account),
            Err(e) => {
                warn!(error = %e, "Profile fetch failed during status check");
                None
            }
        }
    }

    fn persist(&self, token: &str, user: Option<&UserProfile>) {
        if let Err(e) = self.vault.set(TOKEN_KEY, token) {
            warn!(error = %e, "Failed to persist auth token");
        }
        let Some(user) = user else { return };
        match serde_json::to_string(user) {
            Ok(json) => {
                if let Err(e) = self.vault.set(PROFILE_KEY, &json) {
                    warn!(error = %e, "Failed to persist profile");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize profile"),
        }
    }
}

impl<P, C, D> Drop for SessionStore<P, C, D> {
    fn drop(&mut self) {
        self.inbox.abort();
        self.listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::auth::profiles::MemoryProfileStore;
    use crate::auth::vault::MemoryStore;

    const VALID_EMAIL: &str = "ada@example.com";
    const VALID_PASSWORD: &str = "Abcdef1!";

    #[derive(Clone)]
    struct FakeProvider {
        inner: Arc<FakeProviderInner>,
    }

    struct FakeProviderInner {
        current: Mutex<Option<SessionRef>>,
        events: broadcast::Sender<Option<SessionRef>>,
        fail_sign_out: AtomicBool,
    }

    impl FakeProvider {
        fn new() -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                inner: Arc::new(FakeProviderInner {
                    current: Mutex::new(None),
                    events,
                    fail_sign_out: AtomicBool::new(false),
                }),
            }
        }

        fn set_current(&self, session: Option<SessionRef>) {
            *self.inner.current.lock().unwrap() = session;
        }

        fn emit(&self, session: Option<SessionRef>) {
            let _ = self.inner.events.send(session);
        }

        fn fail_sign_out(&self) {
            self.inner.fail_sign_out.store(true, Ordering::SeqCst);
        }
    }

    impl AuthProvider for FakeProvider {
        async fn sign_in(&self, email: &str, password: &str) -> Result<SessionRef, AuthError> {
            if email == VALID_EMAIL && password == VALID_PASSWORD {
                let session = SessionRef {
                    uid: "u-ada".to_string(),
                    token: "issued-token-1".to_string(),
                };
                self.set_current(Some(session.clone()));
                Ok(session)
            } else {
                Err(AuthError::provider(
                    "auth/invalid-credential",
                    "INVALID_LOGIN_CREDENTIALS",
                ))
            }
        }

        async fn sign_up(&self, email: &str, _password: &str) -> Result<SessionRef, AuthError> {
            if email == VALID_EMAIL {
                return Err(AuthError::provider("auth/email-already-in-use", "EMAIL_EXISTS"));
            }
            let session = SessionRef {
                uid: "u-new".to_string(),
                token: "signup-token-1".to_string(),
            };
            self.set_current(Some(session.clone()));
            Ok(session)
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            if self.inner.fail_sign_out.load(Ordering::SeqCst) {
                return Err(AuthError::provider(
                    "auth/network-request-failed",
                    "NETWORK_ERROR",
                ));
            }
            self.set_current(None);
            Ok(())
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn send_email_verification(&self) -> Result<(), AuthError> {
            Ok(())
        }

        async fn update_profile(
            &self,
            _display_name: &str,
            _photo_url: Option<&str>,
        ) -> Result<(), AuthError> {
            Ok(())
        }

        fn current_session(&self) -> Option<SessionRef> {
            self.inner.current.lock().unwrap().clone()
        }

        fn subscribe(&self) -> broadcast::Receiver<Option<SessionRef>> {
            self.inner.events.subscribe()
        }
    }

    type TestStore = SessionStore<FakeProvider, Arc<MemoryStore>, Arc<MemoryProfileStore>>;

    fn store_with(provider: FakeProvider) -> (TestStore, Arc<MemoryStore>, Arc<MemoryProfileStore>) {
        let vault = Arc::new(MemoryStore::new());
        let profiles = Arc::new(MemoryProfileStore::new());
        let store = SessionStore::new(provider, Arc::clone(&vault), Arc::clone(&profiles));
        (store, vault, profiles)
    }

    /// Let the inbox and listener tasks drain. Time is paused in these tests,
    /// so this only yields until the runtime is idle.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_without_session_routes_onboarding() {
        let (store, _vault, _profiles) = store_with(FakeProvider::new());
        store.check_status().await;
        settle().await;

        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.route(), Route::Onboarding);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_success_authenticates_and_persists() {
        let (store, vault, _profiles) = store_with(FakeProvider::new());

        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        settle().await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.token.as_deref(), Some("issued-token-1"));
        assert!(!session.is_loading);
        assert_eq!(session.error, None);
        assert_eq!(
            vault.get(TOKEN_KEY).unwrap().as_deref(),
            Some("issued-token-1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_failure_maps_error_and_leaves_auth() {
        let (store, vault, _profiles) = store_with(FakeProvider::new());

        let err = store.login(VALID_EMAIL, "wrong").await.unwrap_err();
        assert_eq!(err.code().as_deref(), Some("auth/invalid-credential"));
        settle().await;

        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(
            session.error.as_deref(),
            Some("Invalid email or password. Please try again.")
        );
        assert_eq!(vault.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_saves_profile_and_authenticates() {
        let (store, _vault, profiles) = store_with(FakeProvider::new());

        let data = RegistrationData {
            email: "new@example.com".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            mobile_number: "+2348098765432".to_string(),
            password: "Abcdef1!".to_string(),
        };
        store.register(&data).await.unwrap();
        settle().await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        // profile completion is a separate step
        assert!(!session.is_onboarded);
        match session.user {
            Some(UserProfile::Account(ref p)) => {
                assert_eq!(p.full_name(), "Grace Hopper");
                assert_eq!(p.uid, "u-new");
            }
            ref other => panic!("unexpected user: {other:?}"),
        }

        let saved = profiles.get("u-new").await.unwrap().expect("profile saved");
        assert_eq!(saved.email, "new@example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_is_unconditional_and_idempotent() {
        let provider = FakeProvider::new();
        let (store, vault, _profiles) = store_with(provider.clone());

        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        settle().await;
        assert!(store.snapshot().is_authenticated);

        store.logout().await.unwrap();
        settle().await;
        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert_eq!(session.token, None);
        assert_eq!(session.user, None);
        assert_eq!(vault.get(TOKEN_KEY).unwrap(), None);

        // calling again from the signed-out state changes nothing
        store.logout().await.unwrap();
        settle().await;
        assert_eq!(store.snapshot(), session);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_state_even_when_provider_fails() {
        let provider = FakeProvider::new();
        let (store, vault, _profiles) = store_with(provider.clone());

        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        settle().await;

        provider.fail_sign_out();
        assert!(store.logout().await.is_err());
        settle().await;

        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert_eq!(session.token, None);
        assert_eq!(session.user, None);
        assert_eq!(vault.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_event_cannot_downgrade_live_session() {
        let provider = FakeProvider::new();
        let (store, _vault, _profiles) = store_with(provider.clone());

        // manual login: token held in the session only, vault untouched
        store.manual_login("manual-token".to_string()).await;
        settle().await;
        let before = store.snapshot();
        assert_eq!(before.token.as_deref(), Some("manual-token"));

        // a stale provider notification must not replace the fresher state
        provider.set_current(Some(SessionRef {
            uid: "u-other".to_string(),
            token: "provider-token".to_string(),
        }));
        provider.emit(Some(SessionRef {
            uid: "u-other".to_string(),
            token: "provider-token".to_string(),
        }));
        settle().await;

        let after = store.snapshot();
        assert_eq!(after.token, before.token);
        assert_eq!(after.is_authenticated, before.is_authenticated);
        assert_eq!(after.user, before.user);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_event_discovers_sign_in_when_no_token() {
        let provider = FakeProvider::new();
        let (store, _vault, _profiles) = store_with(provider.clone());

        let session_ref = SessionRef {
            uid: "u-ada".to_string(),
            token: "refreshed-token".to_string(),
        };
        provider.set_current(Some(session_ref.clone()));
        provider.emit(Some(session_ref));
        settle().await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.token.as_deref(), Some("refreshed-token"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_null_provider_event_is_ignored() {
        let provider = FakeProvider::new();
        let (store, _vault, _profiles) = store_with(provider.clone());

        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        settle().await;

        provider.emit(None);
        settle().await;

        // sign-out must go through the explicit action
        assert!(store.snapshot().is_authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_onboarding_is_sticky() {
        let (store, _vault, _profiles) = store_with(FakeProvider::new());

        store.complete_onboarding().await;
        store.complete_onboarding().await;
        settle().await;
        assert!(store.snapshot().is_onboarded);

        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        store.send_password_reset(VALID_EMAIL).await.unwrap();
        store.logout().await.unwrap();
        settle().await;
        assert!(store.snapshot().is_onboarded);

        store.reset_onboarding().await;
        settle().await;
        assert!(!store.snapshot().is_onboarded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_reset_touches_only_loading_and_error() {
        let (store, _vault, _profiles) = store_with(FakeProvider::new());

        store.send_password_reset(VALID_EMAIL).await.unwrap();
        settle().await;

        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_google_login_is_immediate() {
        let (store, _vault, _profiles) = store_with(FakeProvider::new());

        store
            .google_login(SocialProfile {
                email: "ada@example.com".to_string(),
                name: "Ada L.".to_string(),
                picture: "https://example.com/p.png".to_string(),
            })
            .await;
        settle().await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.token, None);
        assert_eq!(session.route(), Route::Private);
        match session.user {
            Some(UserProfile::Social(ref p)) => assert_eq!(p.name, "Ada L."),
            ref other => panic!("unexpected user: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rehydration_restores_persisted_session() {
        let provider = FakeProvider::new();
        let vault = Arc::new(MemoryStore::new());
        vault.set(TOKEN_KEY, "persisted-token").unwrap();
        provider.set_current(Some(SessionRef {
            uid: "u-ada".to_string(),
            token: "live-token".to_string(),
        }));

        let store = SessionStore::new(
            provider,
            Arc::clone(&vault),
            Arc::new(MemoryProfileStore::new()),
        );
        store.check_status().await;
        settle().await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        // the persisted token wins over the live session's token
        assert_eq!(session.token.as_deref(), Some("persisted-token"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_clears_on_next_successful_action() {
        let (store, _vault, _profiles) = store_with(FakeProvider::new());

        let _ = store.login(VALID_EMAIL, "wrong").await;
        settle().await;
        assert!(store.snapshot().error.is_some());

        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        settle().await;
        assert_eq!(store.snapshot().error, None);

        store.set_error("boom").await;
        settle().await;
        assert_eq!(store.snapshot().error.as_deref(), Some("boom"));
        store.clear_error().await;
        settle().await;
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_journey_onboarding_to_logout() {
        let (store, _vault, _profiles) = store_with(FakeProvider::new());

        // fresh install: no persisted token, no provider session
        store.check_status().await;
        settle().await;
        assert_eq!(store.snapshot().route(), Route::Onboarding);

        // user walks through the onboarding steps
        store.complete_onboarding().await;
        settle().await;
        let session = store.snapshot();
        assert_eq!(session.route(), Route::Authentication);
        assert_eq!(session.container_key(), "unauthenticated");

        // valid credentials: the private tree mounts under a new container key
        store.login(VALID_EMAIL, VALID_PASSWORD).await.unwrap();
        settle().await;
        let session = store.snapshot();
        assert_eq!(session.route(), Route::Private);
        assert_eq!(session.container_key(), "authenticated");

        // logout lands back on authentication, onboarding stays complete
        store.logout().await.unwrap();
        settle().await;
        let session = store.snapshot();
        assert_eq!(session.route(), Route::Authentication);
        assert_eq!(session.container_key(), "unauthenticated");
        assert!(session.is_onboarded);
    }
}
