//! Session snapshot.
//!
//! A [`Session`] is a point-in-time view of the authentication state. The
//! credentials only exist inside the `Authenticated` variant and the failure
//! payload only inside the `Error` variant, so a snapshot can never claim to
//! be authenticated without a token, or carry a stale error.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::Error;
use crate::types::Claims;
use crate::BearerToken;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not initialized yet.
    Idle,
    /// Provider initialization is in flight.
    Initializing,
    /// A session with a token exists.
    Authenticated,
    /// No session exists.
    Unauthenticated,
    /// The last attempt failed.
    Error,
}

impl Status {
    /// Returns the status name as used by UI consumers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Initializing => "initializing",
            Status::Authenticated => "authenticated",
            Status::Unauthenticated => "unauthenticated",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of the authentication session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// Not initialized yet.
    #[default]
    Idle,

    /// Provider initialization is in flight.
    Initializing,

    /// Logged in.
    Authenticated {
        /// The bearer credential.
        token: BearerToken,
        /// The decoded claims of `token`.
        claims: Claims,
    },

    /// Not logged in.
    Unauthenticated,

    /// The last attempt failed.
    Error(Error),
}

impl Session {
    /// Build a session from the credential state a provider reports.
    ///
    /// A provider claiming to be authenticated without a token yields
    /// `Unauthenticated`. Missing claims on a present token are treated as an
    /// empty claim set.
    pub fn from_credentials(
        authenticated: bool,
        token: Option<BearerToken>,
        claims: Option<Claims>,
    ) -> Self {
        match (authenticated, token) {
            (true, Some(token)) => Session::Authenticated {
                token,
                claims: claims.unwrap_or_default(),
            },
            _ => Session::Unauthenticated,
        }
    }

    /// Returns the lifecycle phase.
    pub fn status(&self) -> Status {
        match self {
            Session::Idle => Status::Idle,
            Session::Initializing => Status::Initializing,
            Session::Authenticated { .. } => Status::Authenticated,
            Session::Unauthenticated => Status::Unauthenticated,
            Session::Error(_) => Status::Error,
        }
    }

    /// Returns true if the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// Returns the bearer token, present only when authenticated.
    pub fn token(&self) -> Option<&BearerToken> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Returns the decoded claims, present only when a token is.
    pub fn token_parsed(&self) -> Option<&Claims> {
        match self {
            Session::Authenticated { claims, .. } => Some(claims),
            _ => None,
        }
    }

    /// Returns the failure payload, present only in the error state.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Session::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Wire shape of a session for UI consumers.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    status: Status,
    is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a BearerToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_parsed: Option<&'a Claims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for Session {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SessionView {
            status: self.status(),
            is_authenticated: self.is_authenticated(),
            token: self.token(),
            token_parsed: self.token_parsed(),
            error: self.error().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use serde_json::json;

    fn claims(sub: &str) -> Claims {
        Claims::new(json!({ "sub": sub })).unwrap()
    }

    fn all_states() -> Vec<Session> {
        vec![
            Session::Idle,
            Session::Initializing,
            Session::Authenticated {
                token: BearerToken::new("abc"),
                claims: claims("u1"),
            },
            Session::Unauthenticated,
            Session::Error(ProviderError::rejected("server_error").into()),
        ]
    }

    #[test]
    fn flag_matches_status_in_every_state() {
        for session in all_states() {
            assert_eq!(
                session.is_authenticated(),
                session.status() == Status::Authenticated,
                "{:?}",
                session.status()
            );
        }
    }

    #[test]
    fn token_presence_matches_status() {
        for session in all_states() {
            assert_eq!(
                session.token().is_some(),
                session.status() == Status::Authenticated
            );
            assert_eq!(session.token_parsed().is_some(), session.token().is_some());
            assert_eq!(session.error().is_some(), session.status() == Status::Error);
        }
    }

    #[test]
    fn from_credentials_without_token_is_unauthenticated() {
        let session = Session::from_credentials(true, None, Some(claims("u1")));
        assert_eq!(session, Session::Unauthenticated);

        let session = Session::from_credentials(false, Some(BearerToken::new("abc")), None);
        assert_eq!(session, Session::Unauthenticated);
    }

    #[test]
    fn from_credentials_defaults_missing_claims() {
        let session = Session::from_credentials(true, Some(BearerToken::new("abc")), None);
        assert_eq!(session.token_parsed(), Some(&Claims::default()));
    }

    #[test]
    fn serializes_authenticated_view() {
        let session = Session::from_credentials(
            true,
            Some(BearerToken::new("abc")),
            Some(claims("u1")),
        );

        assert_eq!(
            serde_json::to_value(&session).unwrap(),
            json!({
                "status": "authenticated",
                "isAuthenticated": true,
                "token": "abc",
                "tokenParsed": { "sub": "u1" }
            })
        );
    }

    #[test]
    fn serializes_error_view() {
        let session = Session::Error(ProviderError::rejected("server_error").into());

        assert_eq!(
            serde_json::to_value(&session).unwrap(),
            json!({
                "status": "error",
                "isAuthenticated": false,
                "error": "provider error: server_error"
            })
        );
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::Unauthenticated.to_string(), "unauthenticated");
        assert_eq!(Session::default().status(), Status::Idle);
    }
}
