//! Signed access tokens.
//!
//! Tokens are stateless HS256 JWTs whose `sub` claim carries the caller's
//! user id. The signing secret is loaded once at startup and never mutated;
//! the service is a pure function of that secret and its inputs.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bazaar_core::UserId;

use super::AuthError;

/// Claim set embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a decimal string.
    pub sub: String,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: u64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: u64,
}

/// Issues and verifies signed access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// Create a token service from the configured signing secret and lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a signed token whose subject is `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = unix_now()?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verify a token's signature, algorithm, and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Expired` for an out-of-date token and
    /// `AuthError::InvalidToken` for anything else that fails verification.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    ErrorKind::InvalidSignature => {
                        AuthError::InvalidToken("invalid signature".to_owned())
                    }
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })
    }

    /// Read the user id out of a verified claim set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSubject` if `sub` is not a decimal user id.
    pub fn subject(&self, claims: &Claims) -> Result<UserId, AuthError> {
        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidSubject)
    }

    /// Verify a token and resolve its subject in one step.
    ///
    /// # Errors
    ///
    /// Propagates the distinct failure modes of [`Self::verify`] and
    /// [`Self::subject`].
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.verify(token)?;
        self.subject(&claims)
    }
}

/// Current Unix time in seconds.
fn unix_now() -> Result<u64, AuthError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| AuthError::TokenCreation("system clock before Unix epoch".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            &SecretString::from(secret.to_owned()),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let tokens = service("test-signing-key-that-is-long-enough-1234");

        let token = tokens.issue(UserId::new(42)).unwrap();
        assert!(!token.is_empty());

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(tokens.subject(&claims).unwrap(), UserId::new(42));
        assert_eq!(tokens.authenticate(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = service("test-signing-key-that-is-long-enough-1234");
        let verifier = service("a-completely-different-signing-key-5678");

        let token = issuer.issue(UserId::new(1)).unwrap();
        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let tokens = service("test-signing-key-that-is-long-enough-1234");
        let err = tokens.verify("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "test-signing-key-that-is-long-enough-1234";
        let tokens = service(secret);

        // Hand-craft a token whose expiry is well in the past.
        let now = unix_now().unwrap();
        let claims = Claims {
            sub: "7".to_owned(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let stale = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let err = tokens.verify(&stale).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let tokens = service("test-signing-key-that-is-long-enough-1234");
        let claims = Claims {
            sub: "alice".to_owned(),
            iat: 0,
            exp: u64::MAX,
        };
        let err = tokens.subject(&claims).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSubject));
    }
}
