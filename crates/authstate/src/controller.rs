//! Session state machine for an identity-provider client.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use authstate_core::error::ProviderError;
use authstate_core::traits::{EventHooks, IdentityProvider, ProviderEvent};
use authstate_core::{ControllerConfig, RedirectOptions, Result, Session, Status};

use crate::dispatch::{self, ControllerHooks};

/// The owner of the authentication session.
///
/// A `SessionController` holds the only writable copy of the [`Session`]
/// and keeps it in step with an injected [`IdentityProvider`]: explicitly
/// through [`init`], [`login`], [`logout`] and [`refresh_token`], and
/// implicitly through the provider's event hooks.
///
/// # Sharing
///
/// Controllers are cheap to clone (they use an internal `Arc`); every clone
/// drives the same session. Readers obtain snapshots through [`snapshot`] or
/// watch for changes with [`subscribe`]. Each change replaces the whole
/// snapshot, so observers never see a half-applied transition.
///
/// [`init`]: SessionController::init
/// [`login`]: SessionController::login
/// [`logout`]: SessionController::logout
/// [`refresh_token`]: SessionController::refresh_token
/// [`snapshot`]: SessionController::snapshot
/// [`subscribe`]: SessionController::subscribe
pub struct SessionController<P> {
    inner: Arc<ControllerInner<P>>,
}

pub(crate) struct ControllerInner<P> {
    provider: P,
    config: ControllerConfig,
    state: watch::Sender<Session>,
    hooks_registered: AtomicBool,
}

impl<P> Clone for SessionController<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> SessionController<P> {
    pub(crate) fn from_inner(inner: Arc<ControllerInner<P>>) -> Self {
        Self { inner }
    }

    /// Returns a point-in-time copy of the session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Returns the current lifecycle phase.
    pub fn status(&self) -> Status {
        self.inner.state.borrow().status()
    }

    /// Returns true if the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Watch the session for changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Returns the injected identity provider.
    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    /// Returns the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Replace the session, logging the transition.
    pub(crate) fn publish(&self, session: Session) {
        let to = session.status();
        let previous = self.inner.state.send_replace(session);
        let from = previous.status();

        if from != to {
            info!(%from, %to, "Session transition");
        } else {
            debug!(status = %to, "Session updated");
        }
    }

    fn redirect_options(&self) -> RedirectOptions {
        RedirectOptions::new(self.inner.config.redirect_uri.clone())
    }
}

impl<P: IdentityProvider + 'static> SessionController<P> {
    /// Create a controller in the `idle` state.
    pub fn new(provider: P, config: ControllerConfig) -> Self {
        let (state, _) = watch::channel(Session::Idle);

        Self {
            inner: Arc::new(ControllerInner {
                provider,
                config,
                state,
                hooks_registered: AtomicBool::new(false),
            }),
        }
    }

    /// Initialize the session.
    ///
    /// Runs provider initialization only from `idle` or `error`. While
    /// `initializing`, `authenticated` or `unauthenticated`, returns the
    /// current authenticated flag without contacting the provider, so
    /// repeated calls never initialize twice.
    ///
    /// Initialization failures are not returned: they move the session to
    /// `error` with the failure as payload, and the call returns `false`.
    ///
    /// On the first successful initialization the provider event hooks are
    /// registered, after the initial state has been captured.
    #[instrument(skip(self))]
    pub async fn init(&self) -> bool {
        let mut current = false;
        let started = self.inner.state.send_if_modified(|session| match session.status() {
            Status::Initializing | Status::Authenticated | Status::Unauthenticated => {
                current = session.is_authenticated();
                false
            }
            Status::Idle | Status::Error => {
                *session = Session::Initializing;
                true
            }
        });

        if !started {
            debug!(authenticated = current, "Already initialized");
            return current;
        }

        info!("Initializing session");
        match self.inner.provider.init(&self.inner.config.init_options).await {
            Ok(authenticated) => {
                let session = self.capture(authenticated);
                let authenticated = session.is_authenticated();
                self.publish(session);
                self.register_hooks();
                authenticated
            }
            Err(err) => {
                warn!(error = %err, "Initialization failed");
                self.publish(Session::Error(err));
                false
            }
        }
    }

    /// Redirect to the provider's login page.
    ///
    /// The session does not change here; the provider's success event
    /// drives the transition once the user comes back.
    ///
    /// # Errors
    ///
    /// Returns the provider error if the redirect could not be issued.
    #[instrument(skip(self), fields(redirect_uri = %self.inner.config.redirect_uri))]
    pub async fn login(&self) -> Result<()> {
        info!("Redirecting to login");
        self.inner.provider.login(&self.redirect_options()).await
    }

    /// Redirect to the provider's logout endpoint.
    ///
    /// # Errors
    ///
    /// Returns the provider error if the redirect could not be issued.
    #[instrument(skip(self), fields(redirect_uri = %self.inner.config.redirect_uri))]
    pub async fn logout(&self) -> Result<()> {
        info!("Redirecting to logout");
        self.inner.provider.logout(&self.redirect_options()).await
    }

    /// Refresh the token if it expires within the configured default
    /// minimum validity (30 seconds unless configured otherwise).
    ///
    /// See [`refresh_token_with`](Self::refresh_token_with).
    pub async fn refresh_token(&self) -> Result<bool> {
        self.refresh_token_with(self.inner.config.default_min_validity)
            .await
    }

    /// Refresh the token if it expires within `min_validity` seconds.
    ///
    /// Whether or not a renewal happened, the session is re-synchronized
    /// from the provider's credential state afterwards. Returns whether the
    /// token was renewed.
    ///
    /// # Errors
    ///
    /// Returns the provider error if renewal failed; the session is left
    /// unchanged in that case.
    #[instrument(skip(self))]
    pub async fn refresh_token_with(&self, min_validity: u32) -> Result<bool> {
        let refreshed = self.inner.provider.update_token(min_validity).await?;

        let session = self.capture(self.inner.provider.authenticated());
        self.publish(session);

        debug!(refreshed, "Token state synchronized");
        Ok(refreshed)
    }

    /// Apply a provider event to the session.
    ///
    /// Success, logout and error events are applied before this returns. A
    /// token-expired event starts a background refresh.
    pub(crate) fn handle_event(&self, event: ProviderEvent) {
        debug!(event = event.name(), "Provider event");

        match event {
            ProviderEvent::AuthSuccess => self.on_auth_success(),
            ProviderEvent::AuthLogout => self.on_auth_logout(),
            ProviderEvent::TokenExpired => dispatch::spawn_expiry_refresh(self.clone()),
            ProviderEvent::AuthError(err) => self.on_auth_error(err),
        }
    }

    fn on_auth_success(&self) {
        let session = self.capture(true);
        self.publish(session);
    }

    fn on_auth_logout(&self) {
        self.publish(Session::Unauthenticated);
    }

    fn on_auth_error(&self, err: ProviderError) {
        warn!(error = %err, "Provider reported an error");
        self.publish(Session::Error(err.into()));
    }

    /// Try one renewal after the token expired; clear the session unless it
    /// was renewed.
    pub(crate) async fn refresh_after_expiry(&self) {
        let min_validity = self.inner.config.expiry_min_validity;

        let renewed = match self.refresh_token_with(min_validity).await {
            Ok(renewed) => renewed,
            Err(err) => {
                warn!(error = %err, "Token refresh after expiry failed");
                false
            }
        };

        if !renewed {
            info!("Token expired without renewal, clearing session");
            self.publish(Session::Unauthenticated);
        }
    }

    /// Build a session from the provider's current credentials.
    fn capture(&self, authenticated: bool) -> Session {
        let provider = &self.inner.provider;
        Session::from_credentials(authenticated, provider.token(), provider.token_parsed())
    }

    fn register_hooks(&self) {
        if self.inner.hooks_registered.swap(true, Ordering::AcqRel) {
            debug!("Event hooks already registered");
            return;
        }

        let hooks = EventHooks::new(ControllerHooks::new(Arc::downgrade(&self.inner)));
        self.inner.provider.register_hooks(hooks);
        debug!("Event hooks registered");
    }
}

// Custom Debug impl that hides session credentials
impl<P> fmt::Debug for SessionController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("status", &self.status())
            .field("redirect_uri", &self.inner.config.redirect_uri)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}
