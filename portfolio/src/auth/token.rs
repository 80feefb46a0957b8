//! Signed, kind-tagged access and refresh tokens.
//!
//! Tokens are HS256 JWTs. Expiry is checked against the caller-supplied
//! instant instead of the system clock so lockout and expiry behave the same
//! way under a test clock.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::errors::{AuthError, AuthResult};
use super::models::{Role, TokenClaims, TokenKind, VerifiedToken};

/// Token issuer holding the server-side signing secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue an access token carrying the subject's role
    pub fn issue_access(
        &self,
        subject: &str,
        role: Role,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        self.sign(subject, Some(role), TokenKind::Access, ttl, now)
    }

    /// Issue a refresh token. Refresh tokens carry no role claim.
    pub fn issue_refresh(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        self.sign(subject, None, TokenKind::Refresh, ttl, now)
    }

    /// Verify signature, expiry and kind tag, in that order
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Bad signature, malformed token, wrong kind or empty subject
    /// * `AuthError::ExpiredToken` - `exp` is not after `now`
    pub fn verify(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> AuthResult<VerifiedToken> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        if claims.kind != expected || claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(VerifiedToken {
            subject: claims.sub,
            role: claims.role,
        })
    }

    fn sign(
        &self,
        subject: &str,
        role: Option<Role>,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            kind,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET)
    }

    #[test]
    fn test_access_round_trip() {
        let now = Utc::now();
        let token = issuer()
            .issue_access("a@x.com", Role::Admin, Duration::minutes(5), now)
            .unwrap();

        let verified = issuer().verify(&token, TokenKind::Access, now).unwrap();
        assert_eq!(
            verified,
            VerifiedToken {
                subject: "a@x.com".to_string(),
                role: Some(Role::Admin),
            }
        );
    }

    #[test]
    fn test_oversized_ttl_saturates_expiry() {
        let now = Utc::now();
        let token = issuer()
            .issue_refresh("a@x.com", Duration::weeks(1_000_000_000), now)
            .unwrap();

        assert!(issuer().verify(&token, TokenKind::Refresh, now).is_ok());
    }

    #[test]
    fn test_refresh_round_trip_has_no_role() {
        let now = Utc::now();
        let token = issuer()
            .issue_refresh("a@x.com", Duration::days(7), now)
            .unwrap();

        let verified = issuer().verify(&token, TokenKind::Refresh, now).unwrap();
        assert_eq!(verified.subject, "a@x.com");
        assert_eq!(verified.role, None);
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let now = Utc::now();
        let access = issuer()
            .issue_access("a@x.com", Role::User, Duration::minutes(5), now)
            .unwrap();
        let refresh = issuer()
            .issue_refresh("a@x.com", Duration::days(7), now)
            .unwrap();

        assert!(matches!(
            issuer().verify(&refresh, TokenKind::Access, now),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer().verify(&access, TokenKind::Refresh, now),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now();
        let token = issuer()
            .issue_access("a@x.com", Role::User, Duration::minutes(5), issued)
            .unwrap();

        let before = issued + Duration::minutes(4);
        assert!(issuer().verify(&token, TokenKind::Access, before).is_ok());

        let after = issued + Duration::minutes(5);
        assert!(matches!(
            issuer().verify(&token, TokenKind::Access, after),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let token = TokenIssuer::new("another_secret_entirely_0123456789abcd")
            .issue_access("a@x.com", Role::Admin, Duration::minutes(5), now)
            .unwrap();

        assert!(matches!(
            issuer().verify(&token, TokenKind::Access, now),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let now = Utc::now();
        assert!(matches!(
            issuer().verify("not.a.jwt", TokenKind::Access, now),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer().verify("", TokenKind::Access, now),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let now = Utc::now();
        let token = issuer()
            .issue_access("", Role::User, Duration::minutes(5), now)
            .unwrap();

        assert!(matches!(
            issuer().verify(&token, TokenKind::Access, now),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let token = issuer()
            .issue_access("a@x.com", Role::User, Duration::minutes(5), now)
            .unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = issuer()
            .issue_access("a@x.com", Role::Admin, Duration::minutes(5), now)
            .unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let tampered = parts.join(".");

        assert!(matches!(
            issuer().verify(&tampered, TokenKind::Access, now),
            Err(AuthError::InvalidToken)
        ));
    }
}
