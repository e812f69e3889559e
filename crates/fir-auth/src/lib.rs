//! Authentication building blocks for the FIR service
//!
//! ## Features
//! - Argon2id password hashing
//! - HS256 access tokens carrying the username as `sub`
//! - Pluggable credential providers (static table loaded from JSON)
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Duration;
//! use fir_auth::{password, StaticCredentials, TokenIssuer, UserRecord};
//!
//! let hash = password::hash_password("secret").unwrap();
//! let users = StaticCredentials::new(vec![UserRecord::new("admin", "Admin User", hash)]);
//! let issuer = TokenIssuer::new("an-example-signing-key-of-32-bytes!!", Duration::minutes(30)).unwrap();
//!
//! let user = fir_auth::authenticate(&users, "admin", "secret").unwrap();
//! let token = issuer.issue(&user.username).unwrap();
//! assert_eq!(issuer.validate(&token).unwrap().sub, "admin");
//! ```

pub mod credentials;
pub mod error;
pub mod jwt;
pub mod password;

pub use credentials::{authenticate, CredentialProvider, StaticCredentials, UserRecord};
pub use error::AuthError;
pub use jwt::{extract_bearer_token, AccessTokenClaims, TokenIssuer, MIN_SECRET_LEN};
