//! Authentication ports.

use uuid::Uuid;

/// Claims recovered from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub exp: i64,
}

/// Token service trait for signed session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token asserting `user_id`.
    fn issue(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Verify a token. Tampered, malformed and expired tokens all fail with
    /// [`AuthError::InvalidToken`].
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}

impl From<AuthError> for crate::DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => crate::DomainError::Unauthenticated,
            AuthError::Signing(msg) | AuthError::HashingError(msg) => {
                crate::DomainError::Internal(msg)
            }
        }
    }
}
