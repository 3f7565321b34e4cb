//! Bearer-token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the gateway's configured secret. A
//! token proves possession at issue time only; [`AuthService::verify`]
//! additionally checks that the account still exists before trusting the
//! claims.
//!
//! [`AuthService::verify`]: super::AuthService::verify

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use pureskin_core::UserId;

use super::AuthError;
use crate::models::user::User;

/// Token lifetime.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried inside a gateway bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i32,
    /// Display name at issue time.
    pub name: String,
    /// Email at issue time.
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl Claims {
    /// The subject as a typed user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Signs and verifies gateway bearer tokens.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            name: user.name.clone(),
            email: user.email.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| AuthError::TokenSigning)
    }

    /// Decode and verify a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` for any verification failure;
    /// the distinction between "expired" and "forged" is logged, not
    /// surfaced.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                AuthError::InvalidCredential
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pureskin_core::Email;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from("kT9#vLq2$mXw8@nZr4!pJc6&hFd0^sGb"))
    }

    fn test_user() -> User {
        User {
            id: UserId::new(7),
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let signer = signer();
        let token = signer.issue(&test_user()).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.user_id(), UserId::new(7));
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = signer();
        assert!(matches!(
            signer.verify("not-a-token"),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = signer().issue(&test_user()).unwrap();
        let other = TokenSigner::new(&SecretString::from("Qw7!zXc3#vBn9$mKl2@pOi5&uYt8^rEw"));
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let signer = signer();
        let user = test_user();

        // Hand-roll claims already past expiry; leeway must not save them.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.as_i32(),
            name: user.name.clone(),
            email: user.email.as_str().to_owned(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token =
            jsonwebtoken::encode(&Header::default(), &claims, &signer.encoding).unwrap();

        assert!(matches!(
            signer.verify(&token),
            Err(AuthError::InvalidCredential)
        ));
    }
}
