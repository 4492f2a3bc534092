//! Core authentication types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod claims;
mod options;
mod redirect_uri;

pub use claims::Claims;
pub use options::{InitOptions, OnLoad, PkceMethod, RedirectOptions};
pub use redirect_uri::RedirectUri;
