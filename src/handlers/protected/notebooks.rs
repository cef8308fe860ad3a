use axum::{
    extract::{Extension, Path, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::api::{parse_resource_id, ValidatedJson};
use crate::app::AppState;
use crate::auth::OwnerScope;
use crate::database::models::Notebook;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::notebooks::NOTEBOOK_NOT_FOUND;

use super::pdf_response;

#[derive(Debug, Deserialize, Validate)]
pub struct NotebookRequest {
    #[validate(length(min = 1, max = 255, message = "Notebook name must be 1 to 255 characters"))]
    pub name: String,
}

/// GET /notebooks - All notebooks of the caller, oldest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<Notebook>> {
    let scope = OwnerScope::from(&auth_user);
    Ok(ApiResponse::success(state.notebooks.list(&scope).await?))
}

/// POST /notebooks - Create a notebook owned by the caller
///
/// Expected Input:
/// ```json
/// { "name": "Work" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<NotebookRequest>,
) -> ApiResult<Notebook> {
    let scope = OwnerScope::from(&auth_user);
    let notebook = state.notebooks.create(&scope, &payload.name).await?;
    Ok(ApiResponse::created(notebook))
}

/// GET /notebooks/count
pub async fn count(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let scope = OwnerScope::from(&auth_user);
    let count = state.notebooks.count(&scope).await?;
    Ok(ApiResponse::success(json!({ "notebook_count": count })))
}

/// GET /notebooks/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Notebook> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    Ok(ApiResponse::success(state.notebooks.get(&scope, notebook_id).await?))
}

/// GET /notebooks/:id/name
pub async fn name(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    let name = state.notebooks.name(&scope, notebook_id).await?;
    Ok(ApiResponse::success(json!({ "name": name })))
}

/// PUT /notebooks/:id - Rename
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<NotebookRequest>,
) -> ApiResult<Notebook> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    let notebook = state
        .notebooks
        .rename(&scope, notebook_id, &payload.name)
        .await?;
    Ok(ApiResponse::success(notebook))
}

/// DELETE /notebooks/:id - Delete the notebook and every note in it
///
/// Expected Output (Success):
/// ```json
/// { "success": true, "data": { "message": "Notebook deleted successfully", "deleted_notes": 3 } }
/// ```
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    let removed = state.notebooks.delete(&scope, notebook_id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Notebook deleted successfully",
        "deleted_notes": removed
    })))
}

/// POST /notebooks/:id/export - Render the notebook with all its notes as a PDF
pub async fn export(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;

    let notebook = state.notebooks.get(&scope, notebook_id).await?;
    let notes = state.notes.list(&scope, notebook_id).await?;
    let pdf = state.export.export_notebook(&notebook, &notes).await?;

    tracing::info!(%notebook_id, notes = notes.len(), "Exported notebook");
    Ok(pdf_response(pdf))
}
