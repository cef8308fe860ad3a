use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::OwnerScope;
use crate::database::models::{NewNote, Note, NoteChanges, Notebook, User};
use crate::database::DatabaseError;
use crate::types::PageRequest;

/// Persistence seam shared by the Postgres and in-memory backends.
///
/// Every notebook and note call takes an [`OwnerScope`]; rows owned by anyone
/// else behave exactly like rows that do not exist and surface as
/// [`DatabaseError::NotFound`] (or an empty list / zero count).
#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Fails with [`DatabaseError::Conflict`] when the username is taken.
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;
    async fn lookup_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn lookup_by_id(&self, user_id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<User, DatabaseError>;

    // Notebooks

    async fn create_notebook(&self, scope: &OwnerScope, name: &str) -> Result<Notebook, DatabaseError>;
    /// Oldest first.
    async fn list_notebooks(&self, scope: &OwnerScope) -> Result<Vec<Notebook>, DatabaseError>;
    async fn find_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Notebook, DatabaseError>;
    async fn rename_notebook(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        name: &str,
    ) -> Result<Notebook, DatabaseError>;
    /// Removes the notebook and all of its notes atomically; returns how many notes went with it.
    async fn delete_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<u64, DatabaseError>;
    async fn count_notebooks(&self, scope: &OwnerScope) -> Result<i64, DatabaseError>;

    // Notes

    /// The target notebook must belong to the scope owner.
    async fn create_note(&self, scope: &OwnerScope, note: NewNote) -> Result<Note, DatabaseError>;
    /// Oldest first.
    async fn list_notes(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Vec<Note>, DatabaseError>;
    /// Returns the requested window and the total matching count.
    async fn list_notes_page(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Note>, i64), DatabaseError>;
    async fn count_notes(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<i64, DatabaseError>;
    /// When `notebook_id` is given the note must also live in that notebook.
    async fn find_note(
        &self,
        scope: &OwnerScope,
        note_id: Uuid,
        notebook_id: Option<Uuid>,
    ) -> Result<Note, DatabaseError>;
    /// A move (`changes.notebook_id`) requires the target notebook to be owned by the same user.
    async fn update_note(
        &self,
        scope: &OwnerScope,
        note_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Note, DatabaseError>;
    async fn delete_note(&self, scope: &OwnerScope, note_id: Uuid) -> Result<(), DatabaseError>;

    // Lifecycle

    async fn health_check(&self) -> Result<(), DatabaseError>;
    async fn close(&self);
}
