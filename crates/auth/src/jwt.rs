//! Bearer token verification.
//!
//! Verification (signature, expiry, issuer, audience) happens here and only
//! here; everything downstream works with `VerifiedClaims`.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::VerifiedClaims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("unexpected token issuer")]
    InvalidIssuer,

    #[error("unexpected token audience")]
    InvalidAudience,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Verifies a raw bearer token and exposes its claims.
pub trait JwtVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError>;
}

/// HMAC-SHA256 verifier for tokens issued with a shared secret.
#[derive(Clone)]
pub struct Hs256JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_nbf = true;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Require the `iss` claim to equal `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Require the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }
}

impl JwtVerifier for Hs256JwtVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                ErrorKind::InvalidAudience => TokenError::InvalidAudience,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        Ok(VerifiedClaims::new(data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn mint(claims: Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        get_current_timestamp()
    }

    #[test]
    fn valid_token_exposes_claims() {
        let token = mint(json!({ "sub": "alice", "roles": ["ADMIN"], "exp": now() + 600 }), SECRET);
        let claims = Hs256JwtVerifier::new(SECRET).verify(&token).unwrap();
        assert_eq!(claims.subject(), Some("alice"));
        assert_eq!(claims.string_list("roles"), Some(vec!["ADMIN".to_string()]));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint(json!({ "sub": "alice", "exp": now() + 600 }), "other-secret");
        assert_eq!(
            Hs256JwtVerifier::new(SECRET).verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint(json!({ "sub": "alice", "exp": now() - 3600 }), SECRET);
        assert_eq!(Hs256JwtVerifier::new(SECRET).verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn missing_exp_is_malformed() {
        let token = mint(json!({ "sub": "alice" }), SECRET);
        assert!(matches!(
            Hs256JwtVerifier::new(SECRET).verify(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let token = mint(json!({ "sub": "a", "iss": "evil", "exp": now() + 600 }), SECRET);
        let verifier = Hs256JwtVerifier::new(SECRET).with_issuer("https://auth.local");
        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidIssuer));
    }

    #[test]
    fn audience_is_enforced_when_configured() {
        let token = mint(json!({ "sub": "a", "aud": "other", "exp": now() + 600 }), SECRET);
        let verifier = Hs256JwtVerifier::new(SECRET).with_audience("userhub");
        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidAudience));

        let token = mint(json!({ "sub": "a", "aud": "userhub", "exp": now() + 600 }), SECRET);
        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            Hs256JwtVerifier::new(SECRET).verify("not-a-jwt"),
            Err(TokenError::Malformed(_))
        ));
    }
}
