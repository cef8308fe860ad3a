use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::AuthError;
use crate::config::{ConfigError, SecurityConfig};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates signed session tokens.
///
/// Cheap to clone; the keys are shared and never change after startup.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<TokenKeys>,
}

struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Result<Self, ConfigError> {
        if security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        let secret = security.jwt_secret.expose().as_bytes();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            inner: Arc::new(TokenKeys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
                access_ttl: Duration::minutes(security.access_token_ttl_minutes),
                refresh_ttl: Duration::days(security.refresh_token_ttl_days),
            }),
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.inner.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.inner.refresh_ttl
    }

    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(user_id, TokenKind::Access, Utc::now())
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(user_id, TokenKind::Refresh, Utc::now())
    }

    /// Mint a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: Uuid, kind: TokenKind, now: DateTime<Utc>) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::Access => self.inner.access_ttl,
            TokenKind::Refresh => self.inner.refresh_ttl,
        };

        let claims = Claims {
            user_id,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.inner.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature, algorithm, expiry and kind. All failures collapse into
    /// [`AuthError::InvalidToken`].
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.inner.decoding, &self.inner.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        if data.claims.kind != expected {
            tracing::debug!(
                "Token rejected: expected {:?} token, got {:?}",
                expected,
                data.claims.kind
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn service(secret: &str) -> TokenService {
        let config = AppConfig::development().with_jwt_secret(secret);
        TokenService::new(&config.security).unwrap()
    }

    #[test]
    fn access_token_carries_identity() {
        let tokens = service("test-secret");
        let user_id = Uuid::new_v4();

        let token = tokens.issue_access(user_id).unwrap();
        let claims = tokens.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn refresh_token_lives_seven_days() {
        let tokens = service("test-secret");
        let token = tokens.issue_refresh(Uuid::new_v4()).unwrap();
        let claims = tokens.validate(&token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn access_token_rejected_sixteen_minutes_after_issue() {
        let tokens = service("test-secret");
        let issued = Utc::now() - Duration::minutes(16);

        let token = tokens.issue_at(Uuid::new_v4(), TokenKind::Access, issued).unwrap();
        let err = tokens.validate(&token, TokenKind::Access).unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn access_token_accepted_within_lifetime() {
        let tokens = service("test-secret");
        let issued = Utc::now() - Duration::minutes(14);

        let token = tokens.issue_at(Uuid::new_v4(), TokenKind::Access, issued).unwrap();
        assert!(tokens.validate(&token, TokenKind::Access).is_ok());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = service("secret-a").issue_access(Uuid::new_v4()).unwrap();
        let err = service("secret-b").validate(&token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service("test-secret");
        let token = tokens.issue_access(Uuid::new_v4()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = tokens.issue_access(Uuid::new_v4()).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");

        assert!(matches!(
            tokens.validate(&tampered, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            tokens.validate("not-a-jwt", TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let tokens = service("test-secret");
        let now = Utc::now();
        let claims = Claims {
            user_id: Uuid::new_v4(),
            kind: TokenKind::Access,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            tokens.validate(&token, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn kinds_are_not_interchangeable() {
        let tokens = service("test-secret");
        let user_id = Uuid::new_v4();

        let refresh = tokens.issue_refresh(user_id).unwrap();
        assert!(tokens.validate(&refresh, TokenKind::Access).is_err());

        let access = tokens.issue_access(user_id).unwrap();
        assert!(tokens.validate(&access, TokenKind::Refresh).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let config = AppConfig::development();
        assert!(matches!(
            TokenService::new(&config.security),
            Err(ConfigError::MissingJwtSecret)
        ));
    }
}
