//! Table definitions applied at startup by the Postgres store.
//!
//! Notes reference their notebook without `ON DELETE CASCADE`; removing a
//! notebook deletes its notes explicitly inside one transaction.

pub const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            UUID PRIMARY KEY,
    username      TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT users_username_key UNIQUE (username)
)
"#;

pub const CREATE_NOTEBOOKS: &str = r#"
CREATE TABLE IF NOT EXISTS notebooks (
    id         UUID PRIMARY KEY,
    owner_id   UUID NOT NULL REFERENCES users (id),
    name       TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const CREATE_NOTES: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id          UUID PRIMARY KEY,
    owner_id    UUID NOT NULL REFERENCES users (id),
    notebook_id UUID NOT NULL REFERENCES notebooks (id),
    title       TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS notebooks_owner_idx ON notebooks (owner_id, created_at)",
    "CREATE INDEX IF NOT EXISTS notes_notebook_idx ON notes (notebook_id, owner_id, created_at)",
];

/// Statements in dependency order.
pub fn statements() -> impl Iterator<Item = &'static str> {
    [CREATE_USERS, CREATE_NOTEBOOKS, CREATE_NOTES]
        .into_iter()
        .chain(CREATE_INDEXES.iter().copied())
}
