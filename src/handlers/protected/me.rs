use axum::extract::{Extension, State};
use serde::Deserialize;
use validator::Validate;

use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::{UserInfo, UserProfile};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeUsernameRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub new_username: String,
}

/// GET /me - The authenticated user's profile
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<UserProfile> {
    let profile = state.accounts.profile(auth_user.user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /me/username - Rename the authenticated user
pub async fn username_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<ChangeUsernameRequest>,
) -> ApiResult<UserInfo> {
    let user = state
        .accounts
        .change_username(auth_user.user_id, &payload.new_username)
        .await?;
    Ok(ApiResponse::success(user))
}
