// Authentication handlers
// Access-token-only sessions: login returns a bearer token, logout is a
// client-side discard. Every authentication attempt lands in login_history.

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::{headers::UserAgent, TypedHeader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::{
        login_history::{LoginHistoryEntry, NewLoginHistoryEntry},
        profile::Profile,
        user::{NewUser, User, UserError},
    },
    services::referral,
    utils::{hash_password, verify_password, ApiError},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    #[validate(custom = "crate::utils::validation::validate_password")]
    pub password: String,

    pub password_confirmation: String,

    /// Referral code of the sponsoring account, if any
    pub referral_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserView,
}

/// Account view without credentials
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

fn scopes_for(user: &User) -> Vec<String> {
    if user.is_admin {
        vec!["admin".to_string()]
    } else {
        Vec::new()
    }
}

fn token_response(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    let access_token =
        state
            .jwt_service
            .generate_access_token(&user.id.to_string(), &user.email, scopes_for(user))?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_expiry(),
        user: UserView::from(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if request.password != request.password_confirmation {
        return Err(ApiError::Validation(
            "Passwords do not match".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let mut conn = state.diesel_pool.get().await?;

    let user = User::create(
        &mut conn,
        NewUser {
            email: request.email.trim().to_lowercase(),
            password_hash,
            is_admin: false,
        },
    )
    .await?;

    // Referral attribution is best-effort: once the user row is committed,
    // no code lookup or counter failure may fail the request
    if let Some(code) = request.referral_code.as_deref() {
        attribute_referral(&mut conn, code, user.id).await;
    }

    tracing::info!(user_id = %user.id, "Account registered");

    let body = token_response(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(body, "Account created"),
    ))
}

/// Credit a sign-up to the owner of `raw_code`. Infallible by contract:
/// unknown codes, self-referrals and database failures are logged and
/// swallowed so the already-created account is returned regardless.
pub async fn attribute_referral(
    conn: &mut diesel_async::AsyncPgConnection,
    raw_code: &str,
    new_user_id: Uuid,
) {
    let code = raw_code.trim().to_uppercase();
    if code.is_empty() {
        return;
    }

    match Profile::find_by_referral_code(conn, &code).await {
        Ok(referrer) if referrer.user_id != new_user_id => {
            if let Err(e) = referral::record_signup(conn, referrer.user_id, new_user_id).await {
                tracing::warn!(code, error = %e, "Referral attribution failed");
            }
        },
        Ok(_) => {},
        Err(crate::models::profile::ProfileError::NotFound) => {
            tracing::warn!(code, "Sign-up carried an unknown referral code");
        },
        Err(e) => {
            tracing::warn!(code, error = %e, "Referral code lookup failed");
        },
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;

    let user = match User::find_by_email(&mut conn, request.email.trim()).await {
        Ok(user) => user,
        Err(UserError::NotFound) => return Err(ApiError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    let agent = user_agent.map(|TypedHeader(ua)| ua.to_string());
    let ip = Some(addr.ip().to_string());

    let verified = verify_password(&request.password, &user.password_hash)?;
    if !verified || !user.is_active {
        record_attempt(&mut conn, user.id, ip, agent, false).await;
        return Err(if verified {
            ApiError::AccountInactive
        } else {
            ApiError::InvalidCredentials
        });
    }

    record_attempt(&mut conn, user.id, ip, agent, true).await;

    let body = token_response(&state, &user)?;
    Ok(ApiResponse::ok(body, "Login successful"))
}

/// Audit writes never fail a login; a refused insert is logged and dropped
async fn record_attempt(
    conn: &mut diesel_async::AsyncPgConnection,
    user_id: Uuid,
    ip_address: Option<String>,
    user_agent: Option<String>,
    success: bool,
) {
    let outcome = LoginHistoryEntry::append(
        conn,
        NewLoginHistoryEntry {
            user_id,
            ip_address,
            user_agent,
            success,
        },
    )
    .await;

    if let Err(e) = outcome {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to record login attempt");
    }
}

/// GET /api/auth/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let user = User::find_by_id(&mut conn, auth.uuid()?).await?;

    Ok(ApiResponse::ok(UserView::from(&user), "OK"))
}

/// POST /api/auth/logout
/// Stateless sessions: the server has nothing to revoke, the client drops
/// the token. Kept as an endpoint so clients have a uniform sign-out call.
pub async fn logout(auth: AuthenticatedUser) -> impl IntoResponse {
    tracing::debug!(user_id = %auth.user_id, "Logout");
    ApiResponse::ok(serde_json::json!({}), "Logged out")
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,

    #[validate(custom = "crate::utils::validation::validate_password")]
    pub new_password: String,
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut conn = state.diesel_pool.get().await?;
    let user = User::find_by_id(&mut conn, auth.uuid()?).await?;

    if !verify_password(&request.current_password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let new_hash = hash_password(&request.new_password)?;
    User::update_password(&mut conn, user.id, &new_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(ApiResponse::ok(serde_json::json!({}), "Password changed"))
}

const LOGIN_HISTORY_LIMIT: i64 = 20;

/// GET /api/auth/login-history
pub async fn login_history(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let entries =
        LoginHistoryEntry::list_for_user(&mut conn, auth.uuid()?, LOGIN_HISTORY_LIMIT).await?;

    Ok(ApiResponse::ok(entries, "OK"))
}
