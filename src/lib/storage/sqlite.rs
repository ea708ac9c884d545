use std::collections::HashSet;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, Sqlite, SqlitePool};
use crate::core::{NewTodo, Todo};
use crate::storage::TodoStorage;

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument};

/// Model columns other than the primary key, with their DDL.
const TODO_COLUMNS: &[(&str, &str)] = &[
    ("title", "TEXT NOT NULL DEFAULT ''"),
    ("desc", "TEXT NOT NULL DEFAULT ''"),
    ("done", "BOOLEAN NOT NULL DEFAULT 0"),
];

pub struct SQLiteStorage {
    pool: SqlitePool,
}

impl SQLiteStorage {
    /// Opens (creating if needed) the database file at `path` and migrates it.
    pub async fn new(path: &str) -> Result<Self> {
        let url = format!("sqlite://{path}");
        let exists = Sqlite::database_exists(&url)
            .await
            .with_context(|| format!("failed to check for database {path}"))?;
        if !exists {
            #[cfg(feature = "tracing")]
            info!(path = %path, "Creating database");
            Sqlite::create_database(&url)
                .await
                .with_context(|| format!("failed to create database {path}"))?;
        }
        let pool = SqlitePool::connect(&url)
            .await
            .with_context(|| format!("failed to open database {path}"))?;
        Self::from_pool(pool).await
    }

    /// A private in-memory database. The pool is pinned to one connection that
    /// never expires, since every SQLite memory connection is its own database.
    pub async fn new_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("failed to open in-memory database")?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        migrate(&pool).await.context("failed to migrate todos table")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Creates the `todos` table when absent and adds any model column an older
/// table is missing. Safe to run on every start.
#[cfg_attr(feature = "tracing", instrument(skip(pool)))]
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            "desc" TEXT NOT NULL DEFAULT '',
            done BOOLEAN NOT NULL DEFAULT 0
        )"#,
    )
    .execute(pool)
    .await?;

    let existing = sqlx::query("PRAGMA table_info(todos)")
        .fetch_all(pool)
        .await?
        .iter()
        .map(|row| row.try_get::<String, _>("name"))
        .collect::<Result<HashSet<_>, _>>()?;

    for (name, definition) in TODO_COLUMNS {
        if existing.contains(*name) {
            continue;
        }
        #[cfg(feature = "tracing")]
        info!(column = %name, "Adding missing column to todos");
        let statement = format!(r#"ALTER TABLE todos ADD COLUMN "{name}" {definition}"#);
        sqlx::query(&statement).execute(pool).await?;
    }
    Ok(())
}

#[async_trait]
impl TodoStorage for SQLiteStorage {
    #[cfg_attr(feature = "tracing", instrument(skip(self, todo)))]
    async fn insert_todo(&self, todo: &NewTodo) -> Result<Todo> {
        let result = sqlx::query(r#"INSERT INTO todos (title, "desc", done) VALUES (?, ?, ?)"#)
            .bind(&todo.title)
            .bind(&todo.desc)
            .bind(todo.done)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();
        #[cfg(feature = "tracing")]
        debug!(id = id, "Inserted todo");
        Ok(todo.clone().into_todo(id))
    }

    async fn list_todos(&self) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(r#"SELECT id, title, "desc", done FROM todos"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"SELECT id, title, "desc", done FROM todos WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self, todo), fields(id = todo.id)))]
    async fn update_todo(&self, todo: &Todo) -> Result<Todo> {
        let result = sqlx::query(r#"UPDATE todos SET title = ?, "desc" = ?, done = ? WHERE id = ?"#)
            .bind(&todo.title)
            .bind(&todo.desc)
            .bind(todo.done)
            .bind(todo.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("todo {} vanished before it could be saved", todo.id);
        }
        Ok(todo.clone())
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    async fn delete_todo(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        #[cfg(feature = "tracing")]
        debug!(rows = result.rows_affected(), "Deleted todo");
        Ok(result.rows_affected())
    }
}
