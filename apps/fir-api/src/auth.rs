//! Bearer token extractor

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use fir_auth::{extract_bearer_token, UserRecord};

use crate::error::ApiError;
use crate::state::AppState;

/// Who is making the request
///
/// In open mode every request is `Anonymous`. In secured mode extraction
/// fails unless the request carries a valid token for an active user.
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    User(UserRecord),
}

impl Actor {
    pub fn username(&self) -> Option<&str> {
        match self {
            Actor::Anonymous => None,
            Actor::User(user) => Some(&user.username),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth) = &state.auth else {
            return Ok(Actor::Anonymous);
        };

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = extract_bearer_token(header_value).ok_or(ApiError::Unauthorized)?;

        let claims = auth.tokens.validate(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            ApiError::Unauthorized
        })?;

        let user = auth.credentials.get_user(&claims.sub).ok_or_else(|| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a known user");
            ApiError::Unauthorized
        })?;

        if user.disabled {
            return Err(ApiError::InactiveUser);
        }

        Ok(Actor::User(user))
    }
}
