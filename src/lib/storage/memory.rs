use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{NewTodo, Todo};

use super::TodoStorage;

/// Process-local storage. Ids start at 1 and are never reused.
pub struct MemoryStorage {
    todos: RwLock<BTreeMap<i64, Todo>>,
    next_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            todos: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStorage for MemoryStorage {
    async fn insert_todo(&self, todo: &NewTodo) -> Result<Todo> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let todo = todo.clone().into_todo(id);
        self.todos.write().await.insert(id, todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn update_todo(&self, todo: &Todo) -> Result<Todo> {
        let mut todos = self.todos.write().await;
        match todos.get_mut(&todo.id) {
            Some(slot) => {
                *slot = todo.clone();
                Ok(todo.clone())
            }
            None => anyhow::bail!("todo {} vanished before it could be saved", todo.id),
        }
    }

    async fn delete_todo(&self, id: i64) -> Result<u64> {
        Ok(self.todos.write().await.remove(&id).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let storage = MemoryStorage::new();
        let first = storage.insert_todo(&NewTodo::default()).await.unwrap();
        storage.delete_todo(first.id).await.unwrap();
        let second = storage.insert_todo(&NewTodo::default()).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let storage = MemoryStorage::new();
        for title in ["a", "b", "c"] {
            let todo = NewTodo {
                title: title.into(),
                ..Default::default()
            };
            storage.insert_todo(&todo).await.unwrap();
        }
        let titles: Vec<_> = storage
            .list_todos()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id() {
        let storage = MemoryStorage::new();
        assert!(storage.update_todo(&NewTodo::default().into_todo(5)).await.is_err());
        assert_eq!(storage.delete_todo(5).await.unwrap(), 0);
    }
}
