//! authstate-core - Core authentication session types and traits.

pub mod config;
pub mod error;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use config::{ControllerConfig, DEFAULT_MIN_VALIDITY};
pub use error::Error;
pub use session::{Session, Status};
pub use tokens::BearerToken;
pub use traits::{EventHandler, EventHooks, IdentityProvider, ProviderEvent};
pub use types::{Claims, InitOptions, OnLoad, PkceMethod, RedirectOptions, RedirectUri};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
