// handlers/public/auth/logout.rs - POST /logout handler

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

/// POST /logout - Expire both session cookies.
///
/// Stateless: tokens already handed out remain valid until their own expiry.
pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, ApiResponse<Value>) {
    let jar = state.cookies.clear_session(jar);
    (jar, ApiResponse::success(json!({ "message": "Logged out successfully" })))
}
