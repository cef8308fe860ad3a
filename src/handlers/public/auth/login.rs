// handlers/public/auth/login.rs - POST /login handler

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::Session;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

/// POST /login - Authenticate and receive a token pair
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "access_token": "eyJhbGciOiJIUzI1NiI...",
///     "refresh_token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "uuid", "username": "alice" }
///   }
/// }
/// ```
///
/// The same tokens are also set as the `access_token` and `refresh_token`
/// cookies. Unknown usernames and wrong passwords both answer 401
/// "Invalid credentials".
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<Session>), ApiError> {
    let session = state
        .accounts
        .login(&payload.username, &payload.password)
        .await?;

    let jar = state.cookies.with_session(
        jar,
        (session.access_token.as_str(), state.tokens.access_ttl()),
        (session.refresh_token.as_str(), state.tokens.refresh_ttl()),
    );

    Ok((jar, ApiResponse::success(session)))
}
