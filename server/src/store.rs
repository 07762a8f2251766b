//! In-memory todo store.
//!
//! # Design
//! The map and the id counter live together behind one `RwLock`, so `list`
//! and `get` share access while `create`, `update` and `delete` take it
//! exclusively. Callers only ever receive clones; no reference to a stored
//! record escapes the lock.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::model::{Todo, TodoId};

#[derive(Debug)]
struct Inner {
    todos: HashMap<TodoId, Todo>,
    next_id: TodoId,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            todos: HashMap::new(),
            next_id: 1,
        }
    }
}

/// Shared handle to the todo collection. Clones refer to the same store.
#[derive(Clone, Debug, Default)]
pub struct TodoStore {
    inner: Arc<RwLock<Inner>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every todo. Order is unspecified.
    pub async fn list(&self) -> Vec<Todo> {
        let inner = self.inner.read().await;
        inner.todos.values().cloned().collect()
    }

    /// Stores a new todo with the next id and `completed = false`.
    ///
    /// The title is taken as-is; rejecting empty titles is the caller's job.
    pub async fn create(&self, title: String) -> Todo {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        let todo = Todo {
            id,
            title,
            completed: false,
        };
        inner.todos.insert(id, todo.clone());
        inner.next_id += 1;
        todo
    }

    pub async fn get(&self, id: TodoId) -> Option<Todo> {
        let inner = self.inner.read().await;
        inner.todos.get(&id).cloned()
    }

    /// Replaces title and completion flag in place. `None` if `id` is absent.
    pub async fn update(&self, id: TodoId, title: String, completed: bool) -> Option<Todo> {
        let mut inner = self.inner.write().await;
        let todo = inner.todos.get_mut(&id)?;
        todo.title = title;
        todo.completed = completed;
        Some(todo.clone())
    }

    /// Removes the todo, returning whether one was actually removed.
    pub async fn delete(&self, id: TodoId) -> bool {
        let mut inner = self.inner.write().await;
        inner.todos.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.todos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
