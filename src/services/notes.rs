use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::OwnerScope;
use crate::database::models::{NewNote, Note, NoteChanges};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::services::notebooks::notebook_not_found;
use crate::types::{Page, PageRequest};

fn note_not_found(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::NotFound => ApiError::not_found("Note not found"),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn Store>,
}

impl NoteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<(), ApiError> {
        self.store
            .find_notebook(scope, notebook_id)
            .await
            .map(|_| ())
            .map_err(notebook_not_found)
    }

    pub async fn create(&self, scope: &OwnerScope, note: NewNote) -> Result<Note, ApiError> {
        let note = self
            .store
            .create_note(scope, note)
            .await
            .map_err(notebook_not_found)?;
        info!(owner_id = %scope.owner_id(), note_id = %note.id, "Created note");
        Ok(note)
    }

    /// Foreign and missing notebooks both list as empty.
    pub async fn list(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Vec<Note>, ApiError> {
        Ok(self.store.list_notes(scope, notebook_id).await?)
    }

    pub async fn page(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        request: PageRequest,
    ) -> Result<Page<Note>, ApiError> {
        let (items, total) = self.store.list_notes_page(scope, notebook_id, request).await?;
        debug!(%notebook_id, page = request.page, limit = request.limit, total, "Listed note page");
        Ok(Page::new(items, total, request))
    }

    pub async fn count(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<i64, ApiError> {
        self.require_notebook(scope, notebook_id).await?;
        Ok(self.store.count_notes(scope, notebook_id).await?)
    }

    pub async fn get(&self, scope: &OwnerScope, note_id: Uuid, notebook_id: Option<Uuid>) -> Result<Note, ApiError> {
        self.store
            .find_note(scope, note_id, notebook_id)
            .await
            .map_err(note_not_found)
    }

    pub async fn update(&self, scope: &OwnerScope, note_id: Uuid, changes: NoteChanges) -> Result<Note, ApiError> {
        if let Some(target) = changes.notebook_id {
            self.require_notebook(scope, target).await?;
        }
        self.store
            .update_note(scope, note_id, changes)
            .await
            .map_err(note_not_found)
    }

    pub async fn delete(&self, scope: &OwnerScope, note_id: Uuid) -> Result<(), ApiError> {
        self.store
            .delete_note(scope, note_id)
            .await
            .map_err(note_not_found)?;
        info!(owner_id = %scope.owner_id(), %note_id, "Deleted note");
        Ok(())
    }
}
