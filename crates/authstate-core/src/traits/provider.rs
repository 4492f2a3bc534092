//! Identity provider trait.

use async_trait::async_trait;

use crate::types::{Claims, InitOptions, RedirectOptions};
use crate::{BearerToken, Result};

use super::EventHooks;

/// An identity-provider client.
///
/// The provider performs all protocol work: redirect-based login and logout,
/// PKCE, token parsing and renewal. Implementations report asynchronous
/// occurrences through the hooks passed to [`register_hooks`]. Hooks apply
/// synchronously and may call back into the provider's credential
/// accessors, so fire them without holding internal locks.
///
/// [`register_hooks`]: IdentityProvider::register_hooks
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Initialize the provider.
    ///
    /// Resolves to whether a session already exists.
    async fn init(&self, options: &InitOptions) -> Result<bool>;

    /// Issue the login redirect.
    ///
    /// Resolves once the redirect is issued, not once the user returns.
    async fn login(&self, options: &RedirectOptions) -> Result<()>;

    /// Issue the logout redirect.
    async fn logout(&self, options: &RedirectOptions) -> Result<()>;

    /// Renew the token if it expires within `min_validity` seconds.
    ///
    /// Resolves to `true` if the token was renewed and `false` if it is
    /// still valid. Fails if renewal is impossible, for example because the
    /// refresh token expired.
    async fn update_token(&self, min_validity: u32) -> Result<bool>;

    /// The current bearer token, if any.
    fn token(&self) -> Option<BearerToken>;

    /// The decoded claims of the current token, if any.
    fn token_parsed(&self) -> Option<Claims>;

    /// Whether the provider currently holds an authenticated session.
    fn authenticated(&self) -> bool;

    /// Install the event hooks, replacing any previously installed ones.
    fn register_hooks(&self, hooks: EventHooks);
}
