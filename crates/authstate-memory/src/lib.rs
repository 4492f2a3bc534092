//! authstate-memory - In-memory identity provider for authstate.

mod calls;
mod provider;
mod realm;

pub use calls::CallLog;
pub use provider::{MemoryProvider, MemoryProviderBuilder};
pub use realm::DEFAULT_TOKEN_LIFESPAN_SECS;
