//! Core traits for identity-provider behavior.

mod events;
mod provider;

pub use events::{EventHandler, EventHooks, ProviderEvent};
pub use provider::IdentityProvider;
