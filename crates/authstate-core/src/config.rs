//! Session controller configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};
use crate::types::{InitOptions, RedirectUri};

/// Default minimum remaining token validity, in seconds.
pub const DEFAULT_MIN_VALIDITY: u32 = 30;

/// Environment variable holding the application origin.
pub const REDIRECT_URI_ENV: &str = "AUTHSTATE_REDIRECT_URI";

/// Environment variable overriding both minimum validity settings.
pub const MIN_VALIDITY_ENV: &str = "AUTHSTATE_MIN_VALIDITY";

/// Configuration for a session controller.
///
/// # Example
///
/// ```
/// use authstate_core::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{ "redirectUri": "https://app.example.com" }"#).unwrap();
/// assert_eq!(config.redirect_uri.as_str(), "https://app.example.com");
/// assert_eq!(config.default_min_validity, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Origin the provider redirects back to after login and logout.
    pub redirect_uri: RedirectUri,

    /// Options passed to provider initialization.
    #[serde(default)]
    pub init_options: InitOptions,

    /// Minimum validity used by an explicit token refresh.
    #[serde(default = "default_min_validity")]
    pub default_min_validity: u32,

    /// Minimum validity used by the refresh attempted on token expiry.
    #[serde(default = "default_min_validity")]
    pub expiry_min_validity: u32,
}

fn default_min_validity() -> u32 {
    DEFAULT_MIN_VALIDITY
}

impl ControllerConfig {
    /// Create a configuration with default settings for the given origin.
    pub fn new(redirect_uri: RedirectUri) -> Self {
        Self {
            redirect_uri,
            init_options: InitOptions::default(),
            default_min_validity: DEFAULT_MIN_VALIDITY,
            expiry_min_validity: DEFAULT_MIN_VALIDITY,
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the configuration from the process environment.
    ///
    /// Reads [`REDIRECT_URI_ENV`] (required) and [`MIN_VALIDITY_ENV`]
    /// (optional).
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = lookup(REDIRECT_URI_ENV).ok_or_else(|| ConfigError::MissingEnv {
            name: REDIRECT_URI_ENV.to_string(),
        })?;

        let redirect_uri = RedirectUri::new(&origin).map_err(|e| ConfigError::InvalidEnv {
            name: REDIRECT_URI_ENV.to_string(),
            reason: e.to_string(),
        })?;

        let mut config = Self::new(redirect_uri);

        if let Some(raw) = lookup(MIN_VALIDITY_ENV) {
            let min_validity = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidEnv {
                    name: MIN_VALIDITY_ENV.to_string(),
                    reason: e.to_string(),
                })?;
            config.default_min_validity = min_validity;
            config.expiry_min_validity = min_validity;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OnLoad;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn json_defaults() {
        let config = ControllerConfig::from_json(r#"{"redirectUri": "http://localhost:3000"}"#)
            .unwrap();
        assert_eq!(config.init_options.on_load, OnLoad::CheckSso);
        assert_eq!(config.default_min_validity, DEFAULT_MIN_VALIDITY);
        assert_eq!(config.expiry_min_validity, DEFAULT_MIN_VALIDITY);
    }

    #[test]
    fn json_overrides() {
        let config = ControllerConfig::from_json(
            r#"{
                "redirectUri": "https://app.example.com",
                "defaultMinValidity": 5,
                "expiryMinValidity": 60
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_min_validity, 5);
        assert_eq!(config.expiry_min_validity, 60);
    }

    #[test]
    fn json_rejects_bad_origin() {
        let result = ControllerConfig::from_json(r#"{"redirectUri": "http://example.com"}"#);
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse { .. }))));
    }

    #[test]
    fn env_requires_redirect_uri() {
        let result = ControllerConfig::from_lookup(lookup(&[]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingEnv { .. }))
        ));
    }

    #[test]
    fn env_reads_values() {
        let config = ControllerConfig::from_lookup(lookup(&[
            (REDIRECT_URI_ENV, "https://app.example.com"),
            (MIN_VALIDITY_ENV, " 45 "),
        ]))
        .unwrap();
        assert_eq!(config.redirect_uri.as_str(), "https://app.example.com");
        assert_eq!(config.default_min_validity, 45);
        assert_eq!(config.expiry_min_validity, 45);
    }

    #[test]
    fn env_rejects_bad_min_validity() {
        let result = ControllerConfig::from_lookup(lookup(&[
            (REDIRECT_URI_ENV, "https://app.example.com"),
            (MIN_VALIDITY_ENV, "-1"),
        ]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidEnv { .. }))
        ));
    }
}
