use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::OwnerScope;
use crate::database::models::{NewNote, Note, NoteChanges, Notebook, User};
use crate::database::{DatabaseError, Store};
use crate::types::PageRequest;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    notebooks: Vec<Notebook>,
    notes: Vec<Note>,
}

impl Tables {
    fn owns_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> bool {
        self.notebooks
            .iter()
            .any(|nb| nb.id == notebook_id && scope.admits(nb.owner_id))
    }

    fn notes_in<'a>(&'a self, scope: &'a OwnerScope, notebook_id: Uuid) -> impl Iterator<Item = &'a Note> {
        self.notes
            .iter()
            .filter(move |n| n.notebook_id == notebook_id && scope.admits(n.owner_id))
    }
}

/// Process-local store for tests and `--store memory`. Rows keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(DatabaseError::Conflict("users_username_key".into()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn lookup_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn lookup_by_id(&self, user_id: Uuid) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username && u.id != user_id) {
            return Err(DatabaseError::Conflict("users_username_key".into()));
        }
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(DatabaseError::NotFound)?;
        user.username = username.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_notebook(&self, scope: &OwnerScope, name: &str) -> Result<Notebook, DatabaseError> {
        let now = Utc::now();
        let notebook = Notebook {
            id: Uuid::new_v4(),
            owner_id: scope.owner_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.notebooks.push(notebook.clone());
        Ok(notebook)
    }

    async fn list_notebooks(&self, scope: &OwnerScope) -> Result<Vec<Notebook>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notebooks
            .iter()
            .filter(|nb| scope.admits(nb.owner_id))
            .cloned()
            .collect())
    }

    async fn find_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Notebook, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .notebooks
            .iter()
            .find(|nb| nb.id == notebook_id && scope.admits(nb.owner_id))
            .cloned()
            .ok_or(DatabaseError::NotFound)
    }

    async fn rename_notebook(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        name: &str,
    ) -> Result<Notebook, DatabaseError> {
        let mut tables = self.tables.write().await;
        let notebook = tables
            .notebooks
            .iter_mut()
            .find(|nb| nb.id == notebook_id && scope.admits(nb.owner_id))
            .ok_or(DatabaseError::NotFound)?;
        notebook.name = name.to_string();
        notebook.updated_at = Utc::now();
        Ok(notebook.clone())
    }

    async fn delete_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<u64, DatabaseError> {
        // Single write guard: nobody observes the notebook without its notes or vice versa.
        let mut tables = self.tables.write().await;
        if !tables.owns_notebook(scope, notebook_id) {
            return Err(DatabaseError::NotFound);
        }
        let before = tables.notes.len();
        tables.notes.retain(|n| n.notebook_id != notebook_id);
        let removed = (before - tables.notes.len()) as u64;
        tables.notebooks.retain(|nb| nb.id != notebook_id);
        Ok(removed)
    }

    async fn count_notebooks(&self, scope: &OwnerScope) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.notebooks.iter().filter(|nb| scope.admits(nb.owner_id)).count() as i64)
    }

    async fn create_note(&self, scope: &OwnerScope, note: NewNote) -> Result<Note, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.owns_notebook(scope, note.notebook_id) {
            return Err(DatabaseError::NotFound);
        }
        let now = Utc::now();
        let created = Note {
            id: Uuid::new_v4(),
            owner_id: scope.owner_id(),
            notebook_id: note.notebook_id,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
        };
        tables.notes.push(created.clone());
        Ok(created)
    }

    async fn list_notes(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.notes_in(scope, notebook_id).cloned().collect())
    }

    async fn list_notes_page(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Note>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let total = tables.notes_in(scope, notebook_id).count() as i64;
        let items = tables
            .notes_in(scope, notebook_id)
            .skip(page.offset().max(0) as usize)
            .take(page.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn count_notes(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.notes_in(scope, notebook_id).count() as i64)
    }

    async fn find_note(
        &self,
        scope: &OwnerScope,
        note_id: Uuid,
        notebook_id: Option<Uuid>,
    ) -> Result<Note, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .notes
            .iter()
            .find(|n| {
                n.id == note_id
                    && scope.admits(n.owner_id)
                    && notebook_id.map_or(true, |nb| n.notebook_id == nb)
            })
            .cloned()
            .ok_or(DatabaseError::NotFound)
    }

    async fn update_note(
        &self,
        scope: &OwnerScope,
        note_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Note, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(target) = changes.notebook_id {
            if !tables.owns_notebook(scope, target) {
                return Err(DatabaseError::NotFound);
            }
        }
        let note = tables
            .notes
            .iter_mut()
            .find(|n| n.id == note_id && scope.admits(n.owner_id))
            .ok_or(DatabaseError::NotFound)?;

        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        if let Some(notebook_id) = changes.notebook_id {
            note.notebook_id = notebook_id;
        }
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete_note(&self, scope: &OwnerScope, note_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.notes.len();
        tables
            .notes
            .retain(|n| !(n.id == note_id && scope.admits(n.owner_id)));
        if tables.notes.len() == before {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {}
}
