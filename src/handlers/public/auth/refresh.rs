// handlers/public/auth/refresh.rs - POST /refresh-token handler

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::app::AppState;
use crate::auth::cookies::{refresh_token_from, ACCESS_COOKIE_NAME};
use crate::error::ApiError;
use crate::middleware::ApiResponse;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// POST /refresh-token - Mint a new access token from the `refresh_token` cookie.
///
/// Expected Output (Success):
/// ```json
/// { "success": true, "data": { "access_token": "eyJhbGciOiJIUzI1NiI..." } }
/// ```
///
/// The new token is also set as the `access_token` cookie. The refresh token
/// is not rotated and stays valid until it expires.
pub async fn refresh_post(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<RefreshResponse>), ApiError> {
    let refresh_token = refresh_token_from(&jar);
    let access_token = state.accounts.refresh(refresh_token.as_deref())?;

    let jar = jar.add(state.cookies.session_cookie(
        ACCESS_COOKIE_NAME,
        access_token.clone(),
        state.tokens.access_ttl(),
    ));

    Ok((jar, ApiResponse::success(RefreshResponse { access_token })))
}
