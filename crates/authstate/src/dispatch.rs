//! Delivery of provider events to the session controller.

use std::sync::Weak;

use tokio::runtime::Handle;
use tracing::{Instrument, debug, info_span, warn};

use authstate_core::Session;
use authstate_core::traits::{EventHandler, IdentityProvider, ProviderEvent};

use crate::controller::{ControllerInner, SessionController};

/// The handler a controller installs on its provider.
///
/// Holds only a weak reference, so the provider keeping its hooks does not
/// keep the controller alive. Events arriving after the controller is gone
/// are discarded.
pub(crate) struct ControllerHooks<P> {
    controller: Weak<ControllerInner<P>>,
}

impl<P> ControllerHooks<P> {
    pub(crate) fn new(controller: Weak<ControllerInner<P>>) -> Self {
        Self { controller }
    }
}

impl<P: IdentityProvider + 'static> EventHandler for ControllerHooks<P> {
    fn handle(&self, event: ProviderEvent) {
        match self.controller.upgrade() {
            Some(inner) => SessionController::from_inner(inner).handle_event(event),
            None => debug!(event = event.name(), "Controller dropped, discarding provider event"),
        }
    }
}

/// Run the refresh that follows a token-expired event on the current runtime.
///
/// Without a runtime the refresh cannot happen, which counts as a failed
/// renewal: the session is cleared on the spot.
pub(crate) fn spawn_expiry_refresh<P>(controller: SessionController<P>)
where
    P: IdentityProvider + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        warn!("No async runtime to refresh the expired token on, clearing session");
        controller.publish(Session::Unauthenticated);
        return;
    };

    runtime.spawn(
        async move { controller.refresh_after_expiry().await }
            .instrument(info_span!("token_expired")),
    );
}
