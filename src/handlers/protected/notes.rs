use axum::{
    extract::{Extension, Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::api::{parse_resource_id, ValidatedJson};
use crate::app::AppState;
use crate::auth::OwnerScope;
use crate::database::models::{NewNote, Note, NoteChanges};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::notebooks::NOTEBOOK_NOT_FOUND;
use crate::types::{Page, PageRequest};

use super::pdf_response;

const NOTE_NOT_FOUND: &str = "Note not found";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub notebook_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub notebook_id: Option<String>,
}

/// Raw query values; parsed leniently by `PageRequest`.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// POST /notes - Create a note in one of the caller's notebooks
///
/// Expected Input:
/// ```json
/// { "title": "Groceries", "content": "milk, eggs", "notebook_id": "uuid" }
/// ```
///
/// A notebook the caller does not own answers 404 "Notebook not found".
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateNoteRequest>,
) -> ApiResult<Note> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&payload.notebook_id, NOTEBOOK_NOT_FOUND)?;

    let note = state
        .notes
        .create(
            &scope,
            NewNote {
                notebook_id,
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;
    Ok(ApiResponse::created(note))
}

/// GET /notebooks/:id/notes - Every note in the notebook, oldest first
///
/// A notebook the caller does not own, or one that was deleted, lists as `[]`.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Note>> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    Ok(ApiResponse::success(state.notes.list(&scope, notebook_id).await?))
}

/// GET /notebooks/:id/notes/page?page=1&limit=10
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": { "items": [...], "total": 25, "page": 3, "limit": 10, "totalPages": 3 }
/// }
/// ```
pub async fn page(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Note>> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    let request = PageRequest::lenient(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.config.api.default_page_limit,
        state.config.api.max_page_limit,
    );
    Ok(ApiResponse::success(state.notes.page(&scope, notebook_id, request).await?))
}

/// GET /notebooks/:id/notes/count
pub async fn count(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTEBOOK_NOT_FOUND)?;
    let count = state.notes.count(&scope, notebook_id).await?;
    Ok(ApiResponse::success(json!({ "note_count": count })))
}

/// GET /notebooks/:id/notes/:note_id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((id, note_id)): Path<(String, String)>,
) -> ApiResult<Note> {
    let scope = OwnerScope::from(&auth_user);
    let notebook_id = parse_resource_id(&id, NOTE_NOT_FOUND)?;
    let note_id = parse_resource_id(&note_id, NOTE_NOT_FOUND)?;
    let note = state.notes.get(&scope, note_id, Some(notebook_id)).await?;
    Ok(ApiResponse::success(note))
}

/// PUT /notes/:id - Partial update; `notebook_id` moves the note
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateNoteRequest>,
) -> ApiResult<Note> {
    let scope = OwnerScope::from(&auth_user);
    let note_id = parse_resource_id(&id, NOTE_NOT_FOUND)?;
    let notebook_id = payload
        .notebook_id
        .as_deref()
        .map(|raw| parse_resource_id(raw, NOTEBOOK_NOT_FOUND))
        .transpose()?;

    let changes = NoteChanges {
        title: payload.title,
        content: payload.content,
        notebook_id,
    };
    Ok(ApiResponse::success(state.notes.update(&scope, note_id, changes).await?))
}

/// DELETE /notes/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let scope = OwnerScope::from(&auth_user);
    let note_id = parse_resource_id(&id, NOTE_NOT_FOUND)?;
    state.notes.delete(&scope, note_id).await?;
    Ok(ApiResponse::success(json!({ "message": "Note deleted successfully" })))
}

/// POST /notes/:id/export - Render a single note as a PDF
pub async fn export(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let scope = OwnerScope::from(&auth_user);
    let note_id = parse_resource_id(&id, NOTE_NOT_FOUND)?;

    let note = state.notes.get(&scope, note_id, None).await?;
    let pdf = state.export.export_note(&note).await?;

    tracing::info!(%note_id, "Exported note");
    Ok(pdf_response(pdf))
}
