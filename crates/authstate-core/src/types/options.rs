//! Options passed to the identity provider.

use serde::{Deserialize, Serialize};

use super::RedirectUri;

/// What the provider should do when it is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnLoad {
    /// Silently detect an existing session without forcing a login.
    CheckSso,
    /// Redirect to the login page if there is no session.
    LoginRequired,
}

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkceMethod {
    /// SHA-256 code challenge.
    S256,
}

/// Options for provider initialization.
///
/// The defaults are the configuration the session controller always uses:
/// a silent session check, S256 PKCE, and no login iframe polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitOptions {
    /// Initialization mode.
    pub on_load: OnLoad,
    /// PKCE challenge method.
    pub pkce_method: PkceMethod,
    /// Whether the provider polls a hidden iframe for session changes.
    pub check_login_iframe: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            on_load: OnLoad::CheckSso,
            pkce_method: PkceMethod::S256,
            check_login_iframe: false,
        }
    }
}

/// Options for login and logout navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectOptions {
    /// Where the provider sends the browser afterwards.
    pub redirect_uri: RedirectUri,
}

impl RedirectOptions {
    /// Create redirect options targeting the given URI.
    pub fn new(redirect_uri: RedirectUri) -> Self {
        Self { redirect_uri }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_init_options_are_silent_check() {
        let options = InitOptions::default();
        assert_eq!(options.on_load, OnLoad::CheckSso);
        assert_eq!(options.pkce_method, PkceMethod::S256);
        assert!(!options.check_login_iframe);
    }

    #[test]
    fn init_options_use_provider_wire_names() {
        let value = serde_json::to_value(InitOptions::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "onLoad": "check-sso",
                "pkceMethod": "S256",
                "checkLoginIframe": false
            })
        );
    }

    #[test]
    fn redirect_options_serialize_origin() {
        let options = RedirectOptions::new(RedirectUri::new("https://app.example.com").unwrap());
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({ "redirectUri": "https://app.example.com" }));
    }
}
