//! authstate - Client-side authentication session state.
//!
//! This library keeps the authentication state of a UI application in step
//! with an identity-provider client. The provider does the protocol work;
//! a [`SessionController`] owns the resulting [`Session`] and reconciles it
//! against explicit calls and the provider's asynchronous events.
//!
//! # Example
//!
//! ```no_run
//! use authstate::{ControllerConfig, RedirectUri, SessionController};
//! use authstate_memory::MemoryProvider;
//!
//! # async fn example() -> Result<(), authstate::Error> {
//! let origin = RedirectUri::origin_of("https://app.example.com/dashboard")?;
//! let controller = SessionController::new(MemoryProvider::default(), ControllerConfig::new(origin));
//!
//! if !controller.init().await {
//!     controller.login().await?;
//! }
//!
//! let session = controller.snapshot();
//! println!("status: {}", session.status());
//! # Ok(())
//! # }
//! ```

mod controller;
mod dispatch;

pub use controller::SessionController;

// Re-export the core types consumers need alongside the controller
pub use authstate_core::error::{ConfigError, InvalidInputError, ProviderError};
pub use authstate_core::{
    BearerToken, Claims, ControllerConfig, EventHandler, EventHooks, IdentityProvider,
    InitOptions, ProviderEvent, RedirectOptions, RedirectUri, Session, Status,
};
pub use authstate_core::{Error, Result};
