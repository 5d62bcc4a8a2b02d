//! JWT issuance and validation.
//!
//! Tokens are HMAC-signed (HS256) against a single configured secret.
//! Validation rejects any token whose header names a different algorithm, so
//! a token signed with another scheme can never verify, even if an attacker
//! controls the header.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use crate::claims::{Claims, Subject, TokenKind};
use crate::error::TokenError;

/// Issues and validates signed session tokens.
///
/// Access and refresh tokens are issued through the same path and differ
/// only in the expiry duration selected by [`TokenKind`].
pub struct JwtManager {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    /// Creates a new manager for the given issuer and signing secret.
    #[must_use]
    pub fn new(issuer: String, secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Strict time bounds: no clock leeway, and honor not-before.
        validation.leeway = 0;
        validation.validate_nbf = true;

        Self {
            issuer,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Returns the configured access token lifetime.
    ///
    /// Callers setting cookie lifetimes should use this so cookies expire
    /// together with the tokens they carry.
    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Returns the configured refresh token lifetime.
    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issues a signed token of the given kind for a subject.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the signature computation fails.
    pub fn issue(&self, kind: TokenKind, subject: &Subject) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.clone(),
            iss: self.issuer.clone(),
            iat: now,
            nbf: now,
            exp: now + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            TokenError::Signing {
                reason: e.to_string(),
            }
        })
    }

    /// Validates a token string and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Expired`] when the current time is outside `[nbf, exp)`
    /// - [`TokenError::Signature`] when the signature does not verify or the
    ///   token names an unexpected signing algorithm
    /// - [`TokenError::Malformed`] for structurally invalid input or an
    ///   empty subject
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Signature,
                _ => TokenError::Malformed {
                    reason: e.to_string(),
                },
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::Malformed {
                reason: "empty subject".to_string(),
            });
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn manager() -> JwtManager {
        JwtManager::new(
            "gatehouse".to_string(),
            SECRET,
            Duration::minutes(15),
            Duration::days(30),
        )
    }

    /// Signs arbitrary claims with the test secret, bypassing `issue`.
    fn sign_raw(claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign test claims")
    }

    #[test]
    fn issue_then_validate_access_token() {
        let manager = manager();
        let subject = Subject::from("u1");

        let token = manager.issue(TokenKind::Access, &subject).expect("issue");
        let claims = manager.validate(&token).expect("validate");

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.iss, "gatehouse");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn issue_then_validate_refresh_token() {
        let manager = manager();
        let subject = Subject::from("u1");

        let token = manager.issue(TokenKind::Refresh, &subject).expect("issue");
        let claims = manager.validate(&token).expect("validate");

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let manager = manager();
        let now = Utc::now().timestamp();
        let token = sign_raw(&Claims {
            sub: Subject::from("u1"),
            iss: "gatehouse".to_string(),
            iat: now - 120,
            nbf: now - 120,
            exp: now - 60,
        });

        assert_eq!(manager.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_before_not_before_is_rejected() {
        let manager = manager();
        let now = Utc::now().timestamp();
        let token = sign_raw(&Claims {
            sub: Subject::from("u1"),
            iss: "gatehouse".to_string(),
            iat: now,
            nbf: now + 60,
            exp: now + 120,
        });

        assert_eq!(manager.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_just_inside_expiry_is_accepted() {
        let manager = manager();
        let now = Utc::now().timestamp();
        let token = sign_raw(&Claims {
            sub: Subject::from("u1"),
            iss: "gatehouse".to_string(),
            iat: now - 60,
            nbf: now - 60,
            exp: now + 2,
        });

        assert!(manager.validate(&token).is_ok());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let manager = manager();
        let token = manager
            .issue(TokenKind::Access, &Subject::from("u1"))
            .expect("issue");

        // Flip the last character of the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().expect("non-empty token");
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(manager.validate(&tampered), Err(TokenError::Signature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let manager = manager();
        let other = JwtManager::new(
            "gatehouse".to_string(),
            "another-secret",
            Duration::minutes(15),
            Duration::days(30),
        );
        let token = other
            .issue(TokenKind::Access, &Subject::from("u1"))
            .expect("issue");

        assert_eq!(manager.validate(&token), Err(TokenError::Signature));
    }

    #[test]
    fn unexpected_algorithm_is_rejected() {
        let manager = manager();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Subject::from("u1"),
            iss: "gatehouse".to_string(),
            iat: now,
            nbf: now,
            exp: now + 60,
        };
        // Same secret, different HMAC algorithm.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign with HS384");

        assert_eq!(manager.validate(&token), Err(TokenError::Signature));
    }

    #[test]
    fn garbage_input_is_malformed() {
        let manager = manager();
        match manager.validate("not-a-token") {
            Err(TokenError::Malformed { .. }) => {}
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn empty_subject_is_rejected() {
        let manager = manager();
        let now = Utc::now().timestamp();
        let token = sign_raw(&Claims {
            sub: Subject::new(String::new()),
            iss: "gatehouse".to_string(),
            iat: now,
            nbf: now,
            exp: now + 60,
        });

        match manager.validate(&token) {
            Err(TokenError::Malformed { reason }) => assert!(reason.contains("subject")),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
