//! In-memory identity provider implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use authstate_core::error::ProviderError;
use authstate_core::traits::{EventHooks, IdentityProvider};
use authstate_core::types::{Claims, InitOptions, RedirectOptions};
use authstate_core::{BearerToken, Result};

use crate::calls::CallLog;
use crate::realm::{Realm, TokenSet};

/// An identity provider that keeps its sessions in memory.
///
/// `MemoryProvider` behaves like a browser identity-provider client whose
/// authorization server lives in-process: navigation calls are recorded
/// instead of redirecting, tokens are random and run on a manual clock, and
/// the simulation methods fire the same events a real provider would.
///
/// Clones share state, so a test can keep one handle while the session
/// controller owns another.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    inner: Arc<ProviderInner>,
}

#[derive(Debug)]
struct ProviderInner {
    realm: Realm,
    init_delay: Option<StdDuration>,
    state: Mutex<ProviderState>,
}

#[derive(Debug)]
struct ProviderState {
    initialized: bool,
    session: Option<TokenSet>,
    hooks: Option<EventHooks>,
    now: DateTime<Utc>,
    calls: CallLog,
    init_failure: Option<ProviderError>,
    navigation_failure: Option<ProviderError>,
}

/// Builder for [`MemoryProvider`].
#[derive(Debug, Default)]
pub struct MemoryProviderBuilder {
    realm: Realm,
    existing: Option<Existing>,
    init_delay: Option<StdDuration>,
    init_failure: Option<ProviderError>,
}

#[derive(Debug)]
enum Existing {
    Subject(String),
    Credentials(BearerToken, Claims),
}

impl MemoryProviderBuilder {
    /// Register a user with additional claims.
    pub fn user(mut self, subject: impl Into<String>, claims: Map<String, Value>) -> Self {
        self.realm.add_user(subject, claims);
        self
    }

    /// Start with a live session for `subject`, found by the silent check.
    pub fn existing_session(mut self, subject: impl Into<String>) -> Self {
        self.existing = Some(Existing::Subject(subject.into()));
        self
    }

    /// Start with a live session holding exactly these credentials.
    pub fn existing_credentials(mut self, token: BearerToken, claims: Claims) -> Self {
        self.existing = Some(Existing::Credentials(token, claims));
        self
    }

    /// Lifespan of issued access tokens.
    pub fn token_lifespan(mut self, lifespan: Duration) -> Self {
        self.realm.set_token_lifespan(lifespan);
        self
    }

    /// Delay every `init` call by `delay`.
    pub fn init_delay(mut self, delay: StdDuration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    /// Make the first `init` call fail with `error`.
    pub fn fail_init(mut self, error: ProviderError) -> Self {
        self.init_failure = Some(error);
        self
    }

    /// Build the provider.
    pub fn build(self) -> MemoryProvider {
        let now = Utc::now();
        let session = self.existing.map(|existing| match existing {
            Existing::Subject(subject) => self.realm.issue(&subject, now),
            Existing::Credentials(token, claims) => self.realm.adopt(token, claims, now),
        });

        MemoryProvider {
            inner: Arc::new(ProviderInner {
                realm: self.realm,
                init_delay: self.init_delay,
                state: Mutex::new(ProviderState {
                    initialized: false,
                    session,
                    hooks: None,
                    now,
                    calls: CallLog::default(),
                    init_failure: self.init_failure,
                    navigation_failure: None,
                }),
            }),
        }
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MemoryProvider {
    /// Create a builder.
    pub fn builder() -> MemoryProviderBuilder {
        MemoryProviderBuilder::default()
    }

    /// Returns the calls received so far.
    pub fn calls(&self) -> CallLog {
        self.lock().calls.clone()
    }

    /// Returns the current time of the provider clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    /// Move the provider clock forward.
    pub fn advance_clock(&self, by: Duration) {
        let mut state = self.lock();
        state.now += by;
    }

    /// Make the next `init` call fail with `error`.
    pub fn fail_next_init(&self, error: ProviderError) {
        self.lock().init_failure = Some(error);
    }

    /// Make the next `login` or `logout` call fail with `error`.
    pub fn fail_next_navigation(&self, error: ProviderError) {
        self.lock().navigation_failure = Some(error);
    }

    /// Prevent the current session from being renewed.
    pub fn revoke_refresh_token(&self) {
        if let Some(session) = self.lock().session.as_mut() {
            session.refresh_revoked = true;
        }
    }

    /// Simulate the user returning from a successful login as `subject`.
    ///
    /// Fires the success hook and returns the issued token.
    pub fn complete_login(&self, subject: &str) -> BearerToken {
        let tokens = {
            let state = self.lock();
            self.inner.realm.issue(subject, state.now)
        };
        self.install_session(tokens)
    }

    /// Simulate a successful login yielding exactly these credentials.
    pub fn complete_login_with(&self, token: BearerToken, claims: Claims) -> BearerToken {
        let tokens = {
            let state = self.lock();
            self.inner.realm.adopt(token, claims, state.now)
        };
        self.install_session(tokens)
    }

    /// Expire the access token and fire the token-expired hook.
    pub fn expire_token(&self) {
        let hooks = {
            let mut state = self.lock();
            let now = state.now;
            if let Some(session) = state.session.as_mut() {
                session.expires_at = now;
            }
            state.hooks.clone()
        };

        debug!("Access token expired");
        if let Some(hooks) = hooks {
            hooks.token_expired();
        }
    }

    /// End the session from the provider side and fire the logout hook.
    pub fn end_session(&self) {
        let hooks = {
            let mut state = self.lock();
            state.session = None;
            state.hooks.clone()
        };

        info!("Session ended by provider");
        if let Some(hooks) = hooks {
            hooks.auth_logout();
        }
    }

    /// Drop the provider-side session without firing any hook.
    pub fn forget_session(&self) {
        self.lock().session = None;
    }

    /// Fire the error hook.
    pub fn raise_error(&self, error: ProviderError) {
        let hooks = self.lock().hooks.clone();

        warn!(error = %error, "Provider raised error");
        if let Some(hooks) = hooks {
            hooks.auth_error(error);
        }
    }

    fn install_session(&self, tokens: TokenSet) -> BearerToken {
        let token = tokens.access_token.clone();
        let hooks = {
            let mut state = self.lock();
            state.session = Some(tokens);
            state.hooks.clone()
        };

        info!("Login completed");
        if let Some(hooks) = hooks {
            hooks.auth_success();
        }
        token
    }

    fn navigate(&self, options: &RedirectOptions) -> Result<()> {
        let mut state = self.lock();
        state.calls.last_redirect = Some(options.redirect_uri.clone());

        if !state.initialized {
            return Err(ProviderError::NotInitialized.into());
        }
        if let Some(error) = state.navigation_failure.take() {
            return Err(error.into());
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for MemoryProvider {
    #[instrument(skip(self, options))]
    async fn init(&self, options: &InitOptions) -> Result<bool> {
        {
            let mut state = self.lock();
            state.calls.init += 1;
            state.calls.last_init_options = Some(options.clone());
        }

        if let Some(delay) = self.inner.init_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if let Some(error) = state.init_failure.take() {
            warn!(error = %error, "Initialization failed");
            return Err(error.into());
        }

        state.initialized = true;
        let authenticated = state.session.is_some();
        debug!(authenticated, "Initialized");
        Ok(authenticated)
    }

    #[instrument(skip(self, options), fields(redirect_uri = %options.redirect_uri))]
    async fn login(&self, options: &RedirectOptions) -> Result<()> {
        self.lock().calls.login += 1;
        self.navigate(options)?;
        debug!("Login redirect issued");
        Ok(())
    }

    #[instrument(skip(self, options), fields(redirect_uri = %options.redirect_uri))]
    async fn logout(&self, options: &RedirectOptions) -> Result<()> {
        self.lock().calls.logout += 1;
        self.navigate(options)?;

        // The browser leaves the page; the server-side session is gone
        // when it comes back.
        self.lock().session = None;
        debug!("Logout redirect issued");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_token(&self, min_validity: u32) -> Result<bool> {
        let mut state = self.lock();
        state.calls.update_token += 1;
        state.calls.last_min_validity = Some(min_validity);

        if !state.initialized {
            return Err(ProviderError::NotInitialized.into());
        }

        let now = state.now;
        let Some(current) = state.session.as_ref() else {
            return Err(ProviderError::RefreshFailed {
                reason: "no active session".to_string(),
            }
            .into());
        };

        if current.remaining(now) >= i64::from(min_validity) {
            debug!(remaining = current.remaining(now), "Token still valid");
            return Ok(false);
        }

        if current.refresh_revoked {
            warn!("Refresh token revoked");
            return Err(ProviderError::RefreshFailed {
                reason: "refresh token expired".to_string(),
            }
            .into());
        }

        let renewed = self.inner.realm.renew(current, now);
        state.session = Some(renewed);
        debug!("Token renewed");
        Ok(true)
    }

    fn token(&self) -> Option<BearerToken> {
        self.lock()
            .session
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn token_parsed(&self) -> Option<Claims> {
        self.lock()
            .session
            .as_ref()
            .map(|session| session.claims.clone())
    }

    fn authenticated(&self) -> bool {
        self.lock().session.is_some()
    }

    fn register_hooks(&self, hooks: EventHooks) {
        let mut state = self.lock();
        state.calls.hooks_registered += 1;
        state.hooks = Some(hooks);
    }
}
