//! Redirect URI type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated redirect target for login and logout navigation.
///
/// Redirect URIs are application origins: scheme, host and optional port,
/// with any path, query or fragment stripped. They must use HTTPS, or HTTP
/// for localhost during development.
///
/// # Example
///
/// ```
/// use authstate_core::RedirectUri;
///
/// let uri = RedirectUri::origin_of("https://app.example.com/dashboard?tab=1").unwrap();
/// assert_eq!(uri.as_str(), "https://app.example.com");
///
/// let local = RedirectUri::new("http://localhost:5173").unwrap();
/// assert!(local.is_localhost());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RedirectUri(String);

impl RedirectUri {
    /// Create a redirect URI from an origin string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid, is not an origin, or
    /// doesn't meet the scheme requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Self::parse(s)?;

        let has_path = !(url.path().is_empty() || url.path() == "/");
        if has_path || url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::RedirectUri {
                value: s.to_string(),
                reason: "must be an origin without path, query or fragment".to_string(),
            }
            .into());
        }

        Ok(Self(url.origin().ascii_serialization()))
    }

    /// Derive the redirect URI from the origin of any page URL.
    ///
    /// This is the equivalent of reading the current location's origin.
    pub fn origin_of(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Self::parse(s)?;
        Ok(Self(url.origin().ascii_serialization()))
    }

    /// Returns the origin as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this origin points at the local machine.
    pub fn is_localhost(&self) -> bool {
        Url::parse(&self.0)
            .ok()
            .and_then(|url| url.host_str().map(is_localhost))
            .unwrap_or(false)
    }

    fn parse(original: &str) -> Result<Url, Error> {
        let url = Url::parse(original).map_err(|e| InvalidInputError::RedirectUri {
            value: original.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = url.scheme();
        let Some(host) = url.host_str() else {
            return Err(InvalidInputError::RedirectUri {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        };

        // Must be HTTPS (or HTTP for localhost)
        if scheme != "https" && !(scheme == "http" && is_localhost(host)) {
            return Err(InvalidInputError::RedirectUri {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        Ok(url)
    }
}

fn is_localhost(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host == "[::1]" || host == "::1"
}

impl fmt::Display for RedirectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RedirectUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for RedirectUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RedirectUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RedirectUri::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for RedirectUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_origin() {
        let uri = RedirectUri::new("https://app.example.com").unwrap();
        assert_eq!(uri.as_str(), "https://app.example.com");
        assert!(!uri.is_localhost());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let uri = RedirectUri::new("https://app.example.com/").unwrap();
        assert_eq!(uri.as_str(), "https://app.example.com");
    }

    #[test]
    fn keeps_non_default_port() {
        let uri = RedirectUri::new("http://localhost:5173").unwrap();
        assert_eq!(uri.as_str(), "http://localhost:5173");
        assert!(uri.is_localhost());
    }

    #[test]
    fn drops_default_port() {
        let uri = RedirectUri::new("https://app.example.com:443").unwrap();
        assert_eq!(uri.as_str(), "https://app.example.com");
    }

    #[test]
    fn origin_of_strips_path_and_query() {
        let uri = RedirectUri::origin_of("https://app.example.com/a/b?x=1#frag").unwrap();
        assert_eq!(uri.as_str(), "https://app.example.com");
    }

    #[test]
    fn new_rejects_path() {
        assert!(RedirectUri::new("https://app.example.com/callback").is_err());
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(RedirectUri::new("http://app.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(RedirectUri::new("/callback").is_err());
    }

    #[test]
    fn invalid_file_url() {
        assert!(RedirectUri::new("file:///tmp/app").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let uri: RedirectUri = serde_json::from_str("\"https://app.example.com\"").unwrap();
        assert_eq!(uri.as_str(), "https://app.example.com");

        let bad: Result<RedirectUri, _> = serde_json::from_str("\"ftp://app.example.com\"");
        assert!(bad.is_err());
    }
}
