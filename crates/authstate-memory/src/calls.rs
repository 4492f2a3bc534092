//! Record of calls made against the memory provider.

use authstate_core::{InitOptions, RedirectUri};

/// Counts and arguments of the calls a [`MemoryProvider`](crate::MemoryProvider)
/// has received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    /// Number of `init` calls.
    pub init: usize,
    /// Number of `login` calls.
    pub login: usize,
    /// Number of `logout` calls.
    pub logout: usize,
    /// Number of `update_token` calls.
    pub update_token: usize,
    /// Number of times hooks were registered.
    pub hooks_registered: usize,
    /// Options of the most recent `init`.
    pub last_init_options: Option<InitOptions>,
    /// Redirect target of the most recent `login` or `logout`.
    pub last_redirect: Option<RedirectUri>,
    /// Argument of the most recent `update_token`.
    pub last_min_validity: Option<u32>,
}
