//! Password hashing and strength checks.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::errors::{AuthError, AuthResult};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length. Longer input is never hashed.
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Characters accepted as the required symbol class
const SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Argon2id password hasher
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with Argon2id and a fresh random salt
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify a password against a stored PHC digest.
    ///
    /// A malformed digest never matches, and neither does a password longer
    /// than [`MAX_PASSWORD_LENGTH`], which is rejected without hashing.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        if password.chars().count() > MAX_PASSWORD_LENGTH {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Validate password strength
///
/// Requires 8 to 100 characters and one each of uppercase, lowercase,
/// digit and symbol. The error names the first missing class.
pub fn validate_strength(password: &str) -> AuthResult<()> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "length: must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "length: must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "uppercase: must contain an uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::WeakPassword(
            "lowercase: must contain a lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "digit: must contain a digit".to_string(),
        ));
    }

    if !password.chars().any(|c| SYMBOLS.contains(c)) {
        return Err(AuthError::WeakPassword(format!(
            "symbol: must contain one of {SYMBOLS}"
        )));
    }

    Ok(())
}
