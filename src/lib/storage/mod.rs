pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use crate::core::{NewTodo, Todo};

/// Persistence for todo items. Each method is one storage round trip.
#[async_trait]
pub trait TodoStorage: Send + Sync {
    async fn insert_todo(&self, todo: &NewTodo) -> anyhow::Result<Todo>;
    async fn list_todos(&self) -> anyhow::Result<Vec<Todo>>;
    async fn get_todo(&self, id: i64) -> anyhow::Result<Option<Todo>>;
    /// Writes every column of `todo` back to its row.
    async fn update_todo(&self, todo: &Todo) -> anyhow::Result<Todo>;
    /// Returns the number of rows removed; zero is not an error.
    async fn delete_todo(&self, id: i64) -> anyhow::Result<u64>;
}
