use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(&'static str),

    #[error("Token expired")]
    Expired,

    #[error("Signing key must be at least {0} bytes")]
    WeakSecret(usize),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),

    #[error("Failed to load credentials: {0}")]
    Credentials(String),
}
