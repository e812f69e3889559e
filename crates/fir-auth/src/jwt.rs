//! JWT access token generation and validation
//!
//! Uses HS256 with a signing key supplied by configuration. The only
//! claims are the subject (username), issue time and expiry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Shortest signing key accepted, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// JWT Header for HS256
#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// JWT claims for an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

fn mac_for(secret: &[u8], signing_input: &str) -> Result<HmacSha256, AuthError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(
    segment: &str,
    what: &'static str,
) -> Result<T, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or(AuthError::InvalidToken(what))
}

/// Sign `claims` as `header.payload.signature`
fn encode_jwt<T: Serialize>(claims: &T, secret: &[u8]) -> Result<String, AuthError> {
    let signing_input = format!(
        "{}.{}",
        encode_segment(&JwtHeader::default())?,
        encode_segment(claims)?
    );
    let signature = mac_for(secret, &signing_input)?.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Check the signature over `header.payload`, then the header, then decode claims
fn decode_jwt<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T, AuthError> {
    let (signing_input, signature_b64) = token
        .rsplit_once('.')
        .ok_or(AuthError::InvalidToken("malformed token"))?;
    let (header_b64, payload_b64) = signing_input
        .split_once('.')
        .filter(|(_, payload)| !payload.contains('.'))
        .ok_or(AuthError::InvalidToken("malformed token"))?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::InvalidToken("invalid signature encoding"))?;
    mac_for(secret, signing_input)?
        .verify_slice(&signature)
        .map_err(|_| AuthError::InvalidToken("invalid signature"))?;

    let header: JwtHeader = decode_segment(header_b64, "invalid header")?;
    if header.alg != "HS256" {
        return Err(AuthError::InvalidToken("unsupported algorithm"));
    }

    decode_segment(payload_b64, "invalid payload")
}

/// Issues and validates access tokens with one signing key and lifetime
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret(MIN_SECRET_LEN));
        }
        Ok(Self { secret, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `username` valid from now
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AccessTokenClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode_jwt(&claims, &self.secret)
    }

    /// Validate signature and expiry against the current time
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessTokenClaims, AuthError> {
        let claims: AccessTokenClaims = decode_jwt(token, &self.secret)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("missing subject"));
        }

        Ok(claims)
    }
}

/// Extract Bearer token from Authorization header
///
/// The scheme is matched case-insensitively; an empty token is treated as
/// missing.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
