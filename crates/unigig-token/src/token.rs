//! Token issue and verification.

use crate::claims::Claims;
use crate::error::TokenError;
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use unigig_core::Role;
use uuid::Uuid;

/// Default credential lifetime.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Issues signed tokens after successful identity verification.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the shared signing secret.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Create an issuer with a custom token lifetime.
    pub fn with_ttl(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Issue a token asserting `{user_id, role}` for the configured lifetime.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, role, self.ttl);
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }
}

/// Verifies tokens presented by incoming requests.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from the shared signing secret.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        // A token past its expiry is rejected at the timestamp, not after a
        // grace window.
        validation.leeway = 0;
        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_then_verify_round_trips_identity() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let verifier = TokenVerifier::new(SECRET).unwrap();

        let user_id = Uuid::new_v4();
        let token = issuer.issue(user_id, Role::Student).unwrap();
        let claims = verifier.verify(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TTL_HOURS * 3600);
    }

    #[test]
    fn empty_secret_is_rejected_at_construction() {
        assert!(matches!(TokenIssuer::new(""), Err(TokenError::EmptySecret)));
        assert!(matches!(TokenIssuer::new("   "), Err(TokenError::EmptySecret)));
        assert!(matches!(TokenVerifier::new(""), Err(TokenError::EmptySecret)));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let verifier = TokenVerifier::new(SECRET).unwrap();

        let token = issuer.issue(Uuid::new_v4(), Role::Client).unwrap();

        // Flip one character in the signature segment.
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            verifier.verify(&tampered),
            Err(TokenError::VerificationFailed(_))
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let verifier = TokenVerifier::new("another-secret").unwrap();

        let token = issuer.issue(Uuid::new_v4(), Role::Student).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let issuer = TokenIssuer::with_ttl(SECRET, Duration::seconds(-120)).unwrap();
        let verifier = TokenVerifier::new(SECRET).unwrap();

        let token = issuer.issue(Uuid::new_v4(), Role::Student).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Expired)));
    }
}
