use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Identity asserted by a verified session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub role: Role,
}

/// Mints and validates stateless HS256 session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn mint(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("failed to sign session token: {}", e)))
    }

    pub fn validate(&self, token: Option<&str>) -> Result<SessionClaims> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Error::TokenMissing)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            Error::TokenInvalid
        })?;

        Ok(SessionClaims {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new("test-secret-key-0123456789", Duration::days(7))
    }

    #[test]
    fn minted_token_round_trips_identity_and_role() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let token = issuer.mint(user_id, Role::Company).unwrap();
        let claims = issuer.validate(Some(&token)).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, Role::Company);
    }

    #[test]
    fn token_expires_seven_days_out() {
        let issuer = issuer();
        let token = issuer.mint(Uuid::new_v4(), Role::Applicant).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret-key-0123456789"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn missing_token_is_reported_as_missing() {
        assert!(matches!(issuer().validate(None), Err(Error::TokenMissing)));
        assert!(matches!(issuer().validate(Some("  ")), Err(Error::TokenMissing)));
    }

    #[test]
    fn expired_token_is_invalid() {
        let stale = SessionIssuer::new("test-secret-key-0123456789", Duration::seconds(-30));
        let token = stale.mint(Uuid::new_v4(), Role::Applicant).unwrap();
        assert!(matches!(stale.validate(Some(&token)), Err(Error::TokenInvalid)));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let foreign = SessionIssuer::new("another-secret-key-987654", Duration::days(7));
        let token = foreign.mint(Uuid::new_v4(), Role::Company).unwrap();
        assert!(matches!(issuer().validate(Some(&token)), Err(Error::TokenInvalid)));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let issuer = issuer();
        let token = issuer.mint(Uuid::new_v4(), Role::Applicant).unwrap();
        let (signed_part, signature) = token.rsplit_once('.').unwrap();
        let mut signature: Vec<char> = signature.chars().collect();
        signature[0] = if signature[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", signed_part, signature.into_iter().collect::<String>());
        assert!(matches!(issuer.validate(Some(&tampered)), Err(Error::TokenInvalid)));
        assert!(matches!(issuer.validate(Some("not.a.jwt")), Err(Error::TokenInvalid)));
    }
}
