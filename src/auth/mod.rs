pub mod cookies;
pub mod password;
pub mod scope;
pub mod token;

use thiserror::Error;

pub use password::{hash_password, verify_password, PasswordError};
pub use scope::OwnerScope;
pub use token::{Claims, TokenKind, TokenService};

/// Authentication failures. Every variant except `TokenGeneration` surfaces as a 401
/// whose wording does not reveal which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingAuthorization,

    #[error("Invalid token format")]
    MalformedAuthorization,

    /// Bad signature, malformed token, wrong algorithm, wrong kind or expired.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Refresh token is required")]
    MissingRefreshToken,

    /// Unknown username and wrong password alike.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UnknownUser,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
}
