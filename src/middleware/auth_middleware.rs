// JWT bearer authentication middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::debug;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;

/// Extracts and validates the bearer token, then makes the authenticated
/// user available to handlers through request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&request).ok_or_else(|| {
        unauthorized_response("Missing or malformed Authorization header")
    })?;

    let claims = state
        .jwt_service
        .validate_access_token(token)
        .map_err(|e| {
            debug!("Token validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        })?;

    let user = AuthenticatedUser {
        user_id: claims.sub,
        token_id: claims.jti,
        email: claims.email,
        scopes: claims.scope,
        exp: claims.exp,
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": {
                "code": "UNAUTHORIZED",
                "description": message,
            },
            "message": "Authentication required"
        })),
    )
        .into_response()
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| unauthorized_response("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request {
        Request::builder()
            .header(AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn extracts_bearer_token() {
        let req = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&req), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_scheme() {
        let req = request_with_auth("abc.def.ghi");
        assert_eq!(extract_bearer_token(&req), None);
    }

    #[test]
    fn rejects_empty_token() {
        let req = request_with_auth("Bearer ");
        assert_eq!(extract_bearer_token(&req), None);
    }
}
