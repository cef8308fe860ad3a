// handlers/public/auth/register.rs - POST /register handler

use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::UserInfo;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// POST /register - Create a new account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "correct horse" }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "success": true, "data": { "id": "uuid", "username": "alice" } }
/// ```
///
/// The account sits under `data` in the standard envelope. A taken username
/// answers 409 no matter which password was sent.
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<UserInfo> {
    let user = state
        .accounts
        .register(&payload.username, &payload.password)
        .await?;
    Ok(ApiResponse::created(user))
}
