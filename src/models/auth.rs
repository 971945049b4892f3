// Authentication models
// Access token claims carried in every authenticated request

use serde::{Deserialize, Serialize};

/// Access token claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID (UUID format)
    pub jti: String,

    /// User email address
    pub email: String,

    /// Token scope/permissions ("admin" for moderators)
    pub scope: Vec<String>,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

impl AccessTokenClaims {
    pub fn is_admin(&self) -> bool {
        self.scope.iter().any(|s| s == "admin")
    }
}
