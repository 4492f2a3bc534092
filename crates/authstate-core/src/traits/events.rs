//! Provider event hooks.
//!
//! The identity provider reports asynchronous occurrences (a completed
//! login, a logout, an expiring token, an error) through four named slots on
//! [`EventHooks`]. Firing a hook hands the event straight to the installed
//! [`EventHandler`] on the caller's stack, so the subscriber's state reflects
//! the event as soon as the hook returns.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::ProviderError;

/// An event raised by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A login completed and fresh credentials are available.
    AuthSuccess,

    /// The session ended.
    AuthLogout,

    /// The access token expired.
    TokenExpired,

    /// The provider reported an error.
    AuthError(ProviderError),
}

impl ProviderEvent {
    /// Short name of the event for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::AuthSuccess => "auth_success",
            ProviderEvent::AuthLogout => "auth_logout",
            ProviderEvent::TokenExpired => "token_expired",
            ProviderEvent::AuthError(_) => "auth_error",
        }
    }
}

/// Receiver of provider events.
///
/// Handlers run on the stack of whoever fires the hook. They must not block
/// and must not panic; work that needs to wait belongs on a spawned task.
pub trait EventHandler: Send + Sync {
    /// Apply one event.
    fn handle(&self, event: ProviderEvent);
}

impl<F> EventHandler for F
where
    F: Fn(ProviderEvent) + Send + Sync,
{
    fn handle(&self, event: ProviderEvent) {
        self(event)
    }
}

/// The subscription slots a provider fires events into.
///
/// Cloning shares the same handler.
#[derive(Clone)]
pub struct EventHooks {
    handler: Arc<dyn EventHandler>,
}

impl EventHooks {
    /// Create hooks delivering into `handler`.
    pub fn new(handler: impl EventHandler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Fire the success hook.
    pub fn auth_success(&self) {
        self.fire(ProviderEvent::AuthSuccess);
    }

    /// Fire the logout hook.
    pub fn auth_logout(&self) {
        self.fire(ProviderEvent::AuthLogout);
    }

    /// Fire the token-expired hook.
    pub fn token_expired(&self) {
        self.fire(ProviderEvent::TokenExpired);
    }

    /// Fire the error hook with the given payload.
    pub fn auth_error(&self, error: ProviderError) {
        self.fire(ProviderEvent::AuthError(error));
    }

    fn fire(&self, event: ProviderEvent) {
        trace!(event = event.name(), "Firing provider hook");
        self.handler.handle(event);
    }
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (EventHooks, Arc<Mutex<Vec<ProviderEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = EventHooks::new(move |event: ProviderEvent| sink.lock().unwrap().push(event));
        (hooks, seen)
    }

    #[test]
    fn hooks_deliver_before_returning() {
        let (hooks, seen) = recording();

        hooks.auth_success();
        assert_eq!(*seen.lock().unwrap(), vec![ProviderEvent::AuthSuccess]);
    }

    #[test]
    fn hooks_deliver_events_in_order() {
        let (hooks, seen) = recording();

        hooks.auth_success();
        hooks.token_expired();
        hooks.auth_error(ProviderError::rejected("server_error"));
        hooks.auth_logout();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ProviderEvent::AuthSuccess,
                ProviderEvent::TokenExpired,
                ProviderEvent::AuthError(ProviderError::rejected("server_error")),
                ProviderEvent::AuthLogout,
            ]
        );
    }

    #[test]
    fn clones_share_handler() {
        let (hooks, seen) = recording();
        let other = hooks.clone();

        hooks.auth_logout();
        other.auth_logout();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
