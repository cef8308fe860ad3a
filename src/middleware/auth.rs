use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, TokenKind, TokenService};
use crate::error::ApiError;

/// Authenticated identity extracted from a validated access token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.user_id }
    }
}

/// Session middleware guarding every protected route.
///
/// Missing header, malformed header and failed validation each end the
/// request with a 401; on success the caller's identity is placed in the
/// request extensions for handlers to pick up.
pub async fn jwt_auth_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|e| {
        tracing::warn!(path = %request.uri().path(), "Rejected request: {}", e);
        ApiError::from(e)
    })?;

    let claims = tokens.validate(token, TokenKind::Access).map_err(|e| {
        tracing::warn!(path = %request.uri().path(), "Rejected request: {}", e);
        ApiError::from(e)
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!(user_id = %auth_user.user_id, "Request authenticated");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedAuthorization)?;

    if auth_str.trim().is_empty() {
        return Err(AuthError::MissingAuthorization);
    }

    let mut parts = auth_str.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}
