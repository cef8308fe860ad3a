use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::OwnerScope;
use crate::database::models::{NewNote, Note, NoteChanges, Notebook, User};
use crate::database::{schema, DatabaseError, DatabaseManager, Store};
use crate::types::PageRequest;

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";
const NOTEBOOK_COLUMNS: &str = "id, owner_id, name, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, owner_id, notebook_id, title, content, created_at, updated_at";

/// sqlx-backed store. Every notebook/note statement binds the owner id.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they are missing
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for statement in schema::statements() {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn lookup_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn lookup_by_id(&self, user_id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET username = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_notebook(&self, scope: &OwnerScope, name: &str) -> Result<Notebook, DatabaseError> {
        let sql = format!(
            "INSERT INTO notebooks (id, owner_id, name) VALUES ($1, $2, $3) RETURNING {}",
            NOTEBOOK_COLUMNS
        );
        let notebook = sqlx::query_as::<_, Notebook>(&sql)
            .bind(Uuid::new_v4())
            .bind(scope.owner_id())
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(notebook)
    }

    async fn list_notebooks(&self, scope: &OwnerScope) -> Result<Vec<Notebook>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notebooks WHERE owner_id = $1 ORDER BY created_at, id",
            NOTEBOOK_COLUMNS
        );
        let notebooks = sqlx::query_as::<_, Notebook>(&sql)
            .bind(scope.owner_id())
            .fetch_all(&self.pool)
            .await?;
        Ok(notebooks)
    }

    async fn find_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Notebook, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notebooks WHERE id = $1 AND owner_id = $2",
            NOTEBOOK_COLUMNS
        );
        let notebook = sqlx::query_as::<_, Notebook>(&sql)
            .bind(notebook_id)
            .bind(scope.owner_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(notebook)
    }

    async fn rename_notebook(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        name: &str,
    ) -> Result<Notebook, DatabaseError> {
        let sql = format!(
            "UPDATE notebooks SET name = $3, updated_at = now() \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            NOTEBOOK_COLUMNS
        );
        let notebook = sqlx::query_as::<_, Notebook>(&sql)
            .bind(notebook_id)
            .bind(scope.owner_id())
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(notebook)
    }

    async fn delete_notebook(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock the notebook row first so a concurrent note insert cannot slip in.
        let owned: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM notebooks WHERE id = $1 AND owner_id = $2 FOR UPDATE")
                .bind(notebook_id)
                .bind(scope.owner_id())
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(DatabaseError::NotFound);
        }

        let removed = sqlx::query("DELETE FROM notes WHERE notebook_id = $1 AND owner_id = $2")
            .bind(notebook_id)
            .bind(scope.owner_id())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM notebooks WHERE id = $1 AND owner_id = $2")
            .bind(notebook_id)
            .bind(scope.owner_id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Deleted notebook {} with {} notes", notebook_id, removed);
        Ok(removed)
    }

    async fn count_notebooks(&self, scope: &OwnerScope) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notebooks WHERE owner_id = $1")
            .bind(scope.owner_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_note(&self, scope: &OwnerScope, note: NewNote) -> Result<Note, DatabaseError> {
        // Inserts nothing unless the target notebook belongs to the caller.
        let sql = format!(
            "INSERT INTO notes (id, owner_id, notebook_id, title, content) \
             SELECT $1, nb.owner_id, nb.id, $4, $5 FROM notebooks nb \
             WHERE nb.id = $3 AND nb.owner_id = $2 \
             RETURNING {}",
            NOTE_COLUMNS
        );
        let created = sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::new_v4())
            .bind(scope.owner_id())
            .bind(note.notebook_id)
            .bind(&note.title)
            .bind(&note.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_notes(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notes WHERE notebook_id = $1 AND owner_id = $2 ORDER BY created_at, id",
            NOTE_COLUMNS
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(notebook_id)
            .bind(scope.owner_id())
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    async fn list_notes_page(
        &self,
        scope: &OwnerScope,
        notebook_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Note>, i64), DatabaseError> {
        let total = self.count_notes(scope, notebook_id).await?;

        let sql = format!(
            "SELECT {} FROM notes WHERE notebook_id = $1 AND owner_id = $2 \
             ORDER BY created_at, id LIMIT $3 OFFSET $4",
            NOTE_COLUMNS
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(notebook_id)
            .bind(scope.owner_id())
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok((notes, total))
    }

    async fn count_notes(&self, scope: &OwnerScope, notebook_id: Uuid) -> Result<i64, DatabaseError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE notebook_id = $1 AND owner_id = $2")
                .bind(notebook_id)
                .bind(scope.owner_id())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn find_note(
        &self,
        scope: &OwnerScope,
        note_id: Uuid,
        notebook_id: Option<Uuid>,
    ) -> Result<Note, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notes WHERE id = $1 AND owner_id = $2 \
             AND ($3::uuid IS NULL OR notebook_id = $3)",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(note_id)
            .bind(scope.owner_id())
            .bind(notebook_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    async fn update_note(
        &self,
        scope: &OwnerScope,
        note_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Note, DatabaseError> {
        // A move only matches when the destination notebook is the caller's too.
        let sql = format!(
            "UPDATE notes SET \
                title = COALESCE($3, title), \
                content = COALESCE($4, content), \
                notebook_id = COALESCE($5, notebook_id), \
                updated_at = now() \
             WHERE id = $1 AND owner_id = $2 \
               AND ($5::uuid IS NULL OR EXISTS ( \
                   SELECT 1 FROM notebooks WHERE id = $5 AND owner_id = $2)) \
             RETURNING {}",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(note_id)
            .bind(scope.owner_id())
            .bind(changes.title)
            .bind(changes.content)
            .bind(changes.notebook_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    async fn delete_note(&self, scope: &OwnerScope, note_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(note_id)
            .bind(scope.owner_id())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        DatabaseManager::close(&self.pool).await;
    }
}
