#![allow(dead_code)]

use std::time::Duration;

use authstate::{ControllerConfig, RedirectUri, Session, SessionController};
use authstate_memory::MemoryProvider;
use tracing_subscriber::EnvFilter;

/// Origin the test application runs on.
pub const ORIGIN: &str = "https://app.example.com";

/// How long to wait for an event to be applied.
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test subscriber; set RUST_LOG to see controller logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default configuration for the test origin.
pub fn config() -> ControllerConfig {
    ControllerConfig::new(RedirectUri::new(ORIGIN).unwrap())
}

/// Create a controller driving a clone of `provider`.
pub fn controller(provider: &MemoryProvider) -> SessionController<MemoryProvider> {
    init_tracing();
    SessionController::new(provider.clone(), config())
}

/// Wait until the session satisfies `predicate` and return it.
pub async fn wait_for<F>(controller: &SessionController<MemoryProvider>, predicate: F) -> Session
where
    F: FnMut(&Session) -> bool,
{
    let mut rx = controller.subscribe();
    let session = tokio::time::timeout(EVENT_TIMEOUT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for session change")
        .expect("session controller dropped");
    session.clone()
}

/// Check the relations that must hold between the snapshot fields.
pub fn assert_consistent(session: &Session) {
    assert_eq!(
        session.is_authenticated(),
        session.status() == authstate::Status::Authenticated,
        "flag disagrees with status: {:?}",
        session
    );
    assert_eq!(session.token().is_some(), session.is_authenticated());
    assert_eq!(session.token_parsed().is_some(), session.token().is_some());
    assert_eq!(
        session.error().is_some(),
        session.status() == authstate::Status::Error
    );
}
