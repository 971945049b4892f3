// Authenticated user identity injected by the auth middleware

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::ApiError;

/// Authenticated user information extracted from JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token_id: String,
    pub email: String,
    pub scopes: Vec<String>,
    pub exp: u64,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.scopes.iter().any(|s| s == "admin")
    }

    /// Parsed user id; claims always carry a UUID we minted ourselves, so a
    /// parse failure means a forged or corrupted token
    pub fn uuid(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.user_id).map_err(|_| ApiError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
