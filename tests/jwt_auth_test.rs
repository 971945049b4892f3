// Access token issuance and validation without a database

use vitrina_backend::middleware::AuthenticatedUser;
use vitrina_backend::services::{JwtConfig, JwtError, JwtService};

fn test_service(secret: &str) -> JwtService {
    JwtService::new(JwtConfig::new(
        secret,
        3600,
        "vitrina".to_string(),
        "vitrina".to_string(),
    ))
}

#[test]
fn token_roundtrip_preserves_claims() {
    let service = test_service("test-secret-at-least-32-chars-long!!");

    let token = service
        .generate_access_token("user-123", "ana@example.com", vec![])
        .unwrap();
    let claims = service.validate_access_token(&token).unwrap();

    assert_eq!(claims.sub, "user-123");
    assert_eq!(claims.email, "ana@example.com");
    assert!(claims.scope.is_empty());
    assert!(!claims.is_admin());
    assert_eq!(claims.exp, claims.iat + 3600);
}

#[test]
fn admin_scope_travels_in_the_token() {
    let service = test_service("test-secret-at-least-32-chars-long!!");

    let token = service
        .generate_access_token("admin-1", "mod@example.com", vec!["admin".to_string()])
        .unwrap();
    let claims = service.validate_access_token(&token).unwrap();

    assert!(claims.is_admin());

    let user = AuthenticatedUser {
        user_id: claims.sub,
        token_id: claims.jti,
        email: claims.email,
        scopes: claims.scope,
        exp: claims.exp,
    };
    assert!(user.is_admin());
    assert!(user.require_admin().is_ok());
}

#[test]
fn non_admin_is_refused_by_the_guard() {
    let user = AuthenticatedUser {
        user_id: uuid::Uuid::new_v4().to_string(),
        token_id: uuid::Uuid::new_v4().to_string(),
        email: "ana@example.com".to_string(),
        scopes: vec![],
        exp: 0,
    };
    assert!(user.require_admin().is_err());
}

#[test]
fn foreign_key_signature_is_rejected() {
    let issuer = test_service("test-secret-at-least-32-chars-long!!");
    let verifier = test_service("a-completely-different-signing-key!!!");

    let token = issuer
        .generate_access_token("user-123", "ana@example.com", vec![])
        .unwrap();

    assert!(matches!(
        verifier.validate_access_token(&token),
        Err(JwtError::InvalidToken)
    ));
}

#[test]
fn wrong_audience_is_rejected() {
    let issuer = test_service("test-secret-at-least-32-chars-long!!");
    let verifier = JwtService::new(JwtConfig::new(
        "test-secret-at-least-32-chars-long!!",
        3600,
        "other-app".to_string(),
        "vitrina".to_string(),
    ));

    let token = issuer
        .generate_access_token("user-123", "ana@example.com", vec![])
        .unwrap();

    assert!(verifier.validate_access_token(&token).is_err());
}
