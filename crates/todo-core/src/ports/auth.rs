//! Authentication ports: password hashing and bearer tokens.

/// What a verified access token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub username: String,
    /// Unix seconds.
    pub issued_at: i64,
    /// Unix seconds.
    pub exp: i64,
}

/// Issues and verifies signed, time-limited bearer tokens.
pub trait TokenService: Send + Sync {
    fn issue(&self, username: &str) -> Result<String, AuthError>;

    /// Check signature, issuer and expiry, then return the claims.
    /// An expired but otherwise valid token yields [`AuthError::TokenExpired`].
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens, in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// One-way password hashing with per-hash salts.
pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password; `Err` only for an unreadable hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
