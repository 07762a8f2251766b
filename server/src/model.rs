//! Wire and domain types for the todo service.
//!
//! `Todo` is both the stored record and its JSON representation. The request
//! payloads default every field so a missing key decodes to its zero value;
//! validation happens in the router, not in serde.

use serde::{Deserialize, Serialize};

/// Identifier assigned by the store. Starts at 1 and is never reused.
pub type TodoId = u64;

/// A single todo record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
}

/// Body of `POST /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
}

impl CreateTodo {
    /// Returns the title if it holds anything besides whitespace.
    ///
    /// The stored title is the one the client sent, untrimmed.
    pub fn validated_title(self) -> Option<String> {
        if self.title.trim().is_empty() {
            None
        } else {
            Some(self.title)
        }
    }
}

/// Body of `PUT /todos/{id}`. Both fields replace the stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Point-in-time view served by `GET /metrics`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub total_todos: usize,
}
