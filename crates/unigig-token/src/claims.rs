//! Claims carried by an issued credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unigig_core::Role;
use uuid::Uuid;

/// Claims embedded in a signed token.
///
/// Field names are camelCase on the wire to match the rest of the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Role the user registered with.
    pub role: Role,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user valid for `ttl`.
    pub fn new(user_id: Uuid, role: Role, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// When the token expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the expiry timestamp has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_expire_after_ttl() {
        let claims = Claims::new(Uuid::new_v4(), Role::Student, chrono::Duration::hours(24));
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn negative_ttl_is_already_expired() {
        let claims = Claims::new(Uuid::new_v4(), Role::Client, chrono::Duration::seconds(-10));
        assert!(claims.is_expired());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let claims = Claims::new(Uuid::new_v4(), Role::Student, chrono::Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("userId").is_some());
        assert_eq!(json.get("role").unwrap(), "STUDENT");
    }
}
