// JWT access token service
// HS256 with audience/issuer validation. Sessions are access-token only;
// sign-out is a client-side token discard plus the login-history record.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::AccessTokenClaims;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Clock error: {0}")]
    ClockError(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry: u64,
    pub audience: String,
    pub issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: &str, access_token_expiry: u64, audience: String, issuer: String) -> Self {
        Self {
            access_token_expiry,
            audience,
            issuer,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_app_config() -> Self {
        let config = crate::app_config::config();
        Self::new(
            &config.jwt_secret,
            config.jwt_access_expiry,
            config.jwt_audience.clone(),
            config.jwt_issuer.clone(),
        )
    }
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn from_app_config() -> Self {
        Self::new(JwtConfig::from_app_config())
    }

    /// Issue an access token for a user
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
        scope: Vec<String>,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::ClockError(e.to_string()))?
            .as_secs();

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: email.to_string(),
            scope,
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + self.config.access_token_expiry,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.config.encoding_key,
        )
        .map_err(JwtError::from)
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<AccessTokenClaims>(token, &self.config.decoding_key, &validation)?;
        Ok(data.claims)
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig::new(
            "test-secret-key-for-unit-tests",
            3600,
            "vitrina".to_string(),
            "vitrina".to_string(),
        ))
    }

    #[test]
    fn test_token_roundtrip() {
        let service = test_service();
        let token = service
            .generate_access_token("user-1", "user@example.com", vec![])
            .unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "user@example.com");
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_admin_scope() {
        let service = test_service();
        let token = service
            .generate_access_token("user-2", "admin@example.com", vec!["admin".to_string()])
            .unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert!(claims.is_admin());
    }

    #[test]
    fn test_rejects_garbage_and_wrong_key() {
        let service = test_service();
        assert!(matches!(
            service.validate_access_token("not-a-token"),
            Err(JwtError::InvalidToken)
        ));

        let other = JwtService::new(JwtConfig::new(
            "a-different-secret",
            3600,
            "vitrina".to_string(),
            "vitrina".to_string(),
        ));
        let token = other
            .generate_access_token("user-3", "x@example.com", vec![])
            .unwrap();
        assert!(service.validate_access_token(&token).is_err());
    }
}
