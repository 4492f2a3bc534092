//! In-memory user directory and token issuance.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value, json};
use tracing::debug;
use uuid::Uuid;

use authstate_core::{BearerToken, Claims};

/// Default access token lifespan.
pub const DEFAULT_TOKEN_LIFESPAN_SECS: i64 = 300;

/// Credentials issued for one session.
#[derive(Debug, Clone)]
pub(crate) struct TokenSet {
    pub access_token: BearerToken,
    pub claims: Claims,
    pub expires_at: DateTime<Utc>,
    pub session_id: String,
    pub refresh_revoked: bool,
}

impl TokenSet {
    /// Seconds of validity left at `now`, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Users known to the provider and the rules for issuing their tokens.
#[derive(Debug, Clone)]
pub(crate) struct Realm {
    users: HashMap<String, Map<String, Value>>,
    token_lifespan: Duration,
}

impl Default for Realm {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            token_lifespan: Duration::seconds(DEFAULT_TOKEN_LIFESPAN_SECS),
        }
    }
}

impl Realm {
    pub fn add_user(&mut self, subject: impl Into<String>, extra: Map<String, Value>) {
        self.users.insert(subject.into(), extra);
    }

    pub fn set_token_lifespan(&mut self, lifespan: Duration) {
        self.token_lifespan = lifespan;
    }

    #[cfg(test)]
    pub fn token_lifespan(&self) -> Duration {
        self.token_lifespan
    }

    /// Issue a fresh session for `subject`.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> TokenSet {
        let session_id = Uuid::new_v4().to_string();
        self.issue_in_session(subject, session_id, now)
    }

    /// Reissue the access token of an existing session.
    pub fn renew(&self, current: &TokenSet, now: DateTime<Utc>) -> TokenSet {
        let subject = current.claims.subject().unwrap_or_default().to_string();
        self.issue_in_session(&subject, current.session_id.clone(), now)
    }

    /// Wrap externally supplied credentials as a session.
    pub fn adopt(&self, token: BearerToken, claims: Claims, now: DateTime<Utc>) -> TokenSet {
        TokenSet {
            access_token: token,
            claims,
            expires_at: now + self.token_lifespan,
            session_id: Uuid::new_v4().to_string(),
            refresh_revoked: false,
        }
    }

    fn issue_in_session(&self, subject: &str, session_id: String, now: DateTime<Utc>) -> TokenSet {
        let expires_at = now + self.token_lifespan;

        let mut claims = self.users.get(subject).cloned().unwrap_or_default();
        let registered = json!({
            "sub": subject,
            "sid": session_id,
            "iat": now.timestamp(),
            "exp": expires_at.timestamp(),
            "typ": "Bearer",
        });
        if let Value::Object(registered) = registered {
            claims.extend(registered);
        }

        debug!(subject, %expires_at, "Issued access token");

        TokenSet {
            access_token: BearerToken::new(Uuid::new_v4().simple().to_string()),
            claims: Claims::from_map(claims),
            expires_at,
            session_id,
            refresh_revoked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_claims_merge_user_attributes() {
        let mut realm = Realm::default();
        let mut extra = Map::new();
        extra.insert("email".to_string(), json!("alice@example.com"));
        realm.add_user("u1", extra);

        let now = Utc::now();
        let tokens = realm.issue("u1", now);

        assert_eq!(tokens.claims.subject(), Some("u1"));
        assert_eq!(tokens.claims.get_str("email"), Some("alice@example.com"));
        assert_eq!(tokens.claims.get_str("sid"), Some(tokens.session_id.as_str()));
        assert_eq!(tokens.remaining(now), DEFAULT_TOKEN_LIFESPAN_SECS);
    }

    #[test]
    fn renew_keeps_session_and_replaces_token() {
        let realm = Realm::default();
        let now = Utc::now();
        let first = realm.issue("u1", now);
        let later = now + Duration::seconds(200);
        let renewed = realm.renew(&first, later);

        assert_eq!(renewed.session_id, first.session_id);
        assert_ne!(renewed.access_token, first.access_token);
        assert_eq!(renewed.expires_at, later + realm.token_lifespan());
    }

    #[test]
    fn remaining_is_clamped_at_zero() {
        let realm = Realm::default();
        let now = Utc::now();
        let tokens = realm.issue("u1", now);
        assert_eq!(tokens.remaining(now + Duration::hours(1)), 0);
    }
}
