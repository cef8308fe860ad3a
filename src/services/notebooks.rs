use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::OwnerScope;
use crate::database::models::Notebook;
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;

pub(crate) const NOTEBOOK_NOT_FOUND: &str = "Notebook not found";

/// Map a store miss onto the notebook-specific 404.
pub(crate) fn notebook_not_found(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::NotFound => ApiError::not_found(NOTEBOOK_NOT_FOUND),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct NotebookService {
    store: Arc<dyn Store>,
}

impl NotebookService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, scope: &OwnerScope, name: &str) -> Result<Notebook, ApiError> {
        let notebook = self.store.create_notebook(scope, name).await?;
        info!(owner_id = %scope.owner_id(), notebook_id = %notebook.id, "Created notebook");
        Ok(notebook)
    }

    pub async fn list(&self, scope: &OwnerScope) -> Result<Vec<Notebook>, ApiError> {
        Ok(self.store.list_notebooks(scope).await?)
    }

    pub async fn get(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Notebook, ApiError> {
        self.store
            .find_notebook(scope, notebook_id)
            .await
            .map_err(notebook_not_found)
    }

    pub async fn name(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<String, ApiError> {
        Ok(self.get(scope, notebook_id).await?.name)
    }

    pub async fn rename(&self, scope: &OwnerScope, notebook_id: Uuid, name: &str) -> Result<Notebook, ApiError> {
        self.store
            .rename_notebook(scope, notebook_id, name)
            .await
            .map_err(notebook_not_found)
    }

    /// Deletes the notebook with every note in it. Returns the number of notes removed.
    pub async fn delete(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<u64, ApiError> {
        let removed = self
            .store
            .delete_notebook(scope, notebook_id)
            .await
            .map_err(notebook_not_found)?;
        info!(owner_id = %scope.owner_id(), %notebook_id, removed, "Deleted notebook");
        Ok(removed)
    }

    pub async fn count(&self, scope: &OwnerScope) -> Result<i64, ApiError> {
        Ok(self.store.count_notebooks(scope).await?)
    }
}
