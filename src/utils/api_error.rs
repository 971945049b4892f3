// API error handling
// One taxonomy for every component boundary: validation, auth, not-found,
// precondition, transient. Errors convert to user-facing JSON responses
// with stable codes; nothing here can crash a handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::profile::ProfileError;
use crate::models::promo_code::PromoCodeError;
use crate::models::user::UserError;
use crate::services::jwt::JwtError;
use crate::services::media::MediaPolicyError;
use crate::services::premium::PremiumError;
use crate::services::promo::PromoError;
use crate::services::referral::ReferralError;
use crate::services::story::StoryServiceError;
use crate::storage::StorageError;
use crate::utils::password::PasswordError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not allowed")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{message}")]
    Precondition {
        code: &'static str,
        message: String,
    },

    #[error("Database error")]
    Database(String),

    #[error("Internal server error")]
    Internal(String),
}

/// Standard error response structure
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub description: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AccountInactive => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::Precondition { .. } => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::AccountInactive => "ACCOUNT_INACTIVE",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DuplicateEmail => "DUPLICATE_EMAIL",
            ApiError::Precondition { code, .. } => code,
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Internal detail is logged, never surfaced
        match &self {
            ApiError::Database(detail) | ApiError::Internal(detail) => {
                tracing::error!(code = self.error_code(), detail, "Request failed");
            },
            _ => {},
        }

        let response = ApiErrorResponse {
            success: false,
            error: ErrorDetail {
                code: self.error_code().to_string(),
                description: self.to_string(),
            },
            message: self.to_string(),
        };

        (self.status_code(), Json(response)).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => ApiError::NotFound("User"),
            UserError::DuplicateEmail => ApiError::DuplicateEmail,
            UserError::Database(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound => ApiError::NotFound("Profile"),
            ProfileError::Database(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<crate::models::review::ReviewError> for ApiError {
    fn from(e: crate::models::review::ReviewError) -> Self {
        use crate::models::review::ReviewError;
        match e {
            ReviewError::NotFound => ApiError::NotFound("Review"),
            ReviewError::NotFlaggable => ApiError::Precondition {
                code: "REVIEW_NOT_FLAGGABLE",
                message: "Only pending reviews can be flagged".to_string(),
            },
            ReviewError::Database(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<PromoError> for ApiError {
    fn from(e: PromoError) -> Self {
        match e {
            PromoError::NotFound => ApiError::NotFound("Promo code"),
            PromoError::Inactive => ApiError::Precondition {
                code: "PROMO_CODE_INACTIVE",
                message: e.to_string(),
            },
            PromoError::Expired => ApiError::Precondition {
                code: "PROMO_CODE_EXPIRED",
                message: e.to_string(),
            },
            PromoError::Exhausted => ApiError::Precondition {
                code: "PROMO_CODE_EXHAUSTED",
                message: e.to_string(),
            },
            PromoError::InvalidPeriod(detail) => ApiError::Internal(detail),
            PromoError::Database(e) => ApiError::Database(e.to_string()),
            PromoError::Premium(e) => e.into(),
        }
    }
}

impl From<PromoCodeError> for ApiError {
    fn from(e: PromoCodeError) -> Self {
        match e {
            PromoCodeError::NotFound => ApiError::NotFound("Promo code"),
            PromoCodeError::DuplicateCode => ApiError::Precondition {
                code: "PROMO_CODE_EXISTS",
                message: "Promo code already exists".to_string(),
            },
            PromoCodeError::Database(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<ReferralError> for ApiError {
    fn from(e: ReferralError) -> Self {
        match e {
            ReferralError::ReferrerNotFound => ApiError::NotFound("Referrer"),
            ReferralError::Database(e) => ApiError::Database(e.to_string()),
            ReferralError::Premium(e) => e.into(),
        }
    }
}

impl From<PremiumError> for ApiError {
    fn from(e: PremiumError) -> Self {
        match e {
            PremiumError::Database(e) => ApiError::Database(e.to_string()),
            PremiumError::WindowOverflow => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StoryServiceError> for ApiError {
    fn from(e: StoryServiceError) -> Self {
        match e {
            StoryServiceError::NotEntitled => ApiError::Forbidden,
            StoryServiceError::NotFound => ApiError::NotFound("Story"),
            StoryServiceError::NotOwner => ApiError::Forbidden,
            StoryServiceError::Database(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<MediaPolicyError> for ApiError {
    fn from(e: MediaPolicyError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::TokenExpired | JwtError::InvalidToken => ApiError::Unauthorized,
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        ApiError::Database(e.to_string())
    }
}

impl<E: std::fmt::Debug> From<bb8::RunError<E>> for ApiError {
    fn from(e: bb8::RunError<E>) -> Self {
        ApiError::Database(format!("connection pool: {:?}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("Profile").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::DuplicateEmail.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(PromoError::Exhausted).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_promo_errors_keep_distinct_codes() {
        assert_eq!(
            ApiError::from(PromoError::Inactive).error_code(),
            "PROMO_CODE_INACTIVE"
        );
        assert_eq!(
            ApiError::from(PromoError::Expired).error_code(),
            "PROMO_CODE_EXPIRED"
        );
        assert_eq!(
            ApiError::from(PromoError::Exhausted).error_code(),
            "PROMO_CODE_EXHAUSTED"
        );
        assert_eq!(
            ApiError::from(PromoError::NotFound).error_code(),
            "NOT_FOUND"
        );
    }
}
