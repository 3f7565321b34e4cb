//! Authentication service.
//!
//! Provides account registration, password login, bearer-token
//! verification, and profile management. Passwords are hashed with
//! Argon2id; tokens are signed JWTs (see [`token`]).

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenSigner};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use pureskin_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{AuthUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 100;

/// Authentication service.
///
/// Handles registration, login, token verification, and account lifecycle.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenSigner) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user and issue a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidName` if the display name is blank or too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Login with email and password, issuing a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong; an unknown email and a wrong password are indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Verify a bearer token and resolve it to a live identity.
    ///
    /// Signature and expiry are checked first, then the subject account is
    /// looked up: a deleted account invalidates its outstanding tokens.
    /// This check resolves before any protected handler runs.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` if the token fails
    /// verification or the account no longer exists.
    pub async fn verify(&self, bearer: &str) -> Result<AuthUser, AuthError> {
        let claims = self.tokens.verify(bearer)?;

        let user = self
            .users
            .get_by_id(claims.user_id())
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        Ok(user.into())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update a user's profile. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`/`AuthError::InvalidName` for bad
    /// input, `AuthError::UserAlreadyExists` if the new email is taken, and
    /// `AuthError::UserNotFound` if the account is gone.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AuthError> {
        let name = name.map(validate_name).transpose()?;
        let email = email.map(Email::parse).transpose()?;

        self.users
            .update_profile(user_id, name.as_deref(), email.as_ref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Delete a user account.
    ///
    /// The account's favorites are removed in the same statement via the
    /// schema's cascade; no orphaned favorites survive.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account doesn't exist.
    pub async fn delete_account(&self, user_id: UserId) -> Result<(), AuthError> {
        let deleted = self.users.delete(user_id).await?;
        if !deleted {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

/// Validate and trim a display name.
fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidName("name cannot be empty".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ada ").unwrap(), "Ada");
        assert!(matches!(
            validate_name("   "),
            Err(AuthError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name(&"x".repeat(101)),
            Err(AuthError::InvalidName(_))
        ));
    }
}
