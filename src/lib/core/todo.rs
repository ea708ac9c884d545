use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A persisted todo item. `id` is assigned by storage on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub desc: String,
    pub done: bool,
}

/// Body accepted by `POST /todos`.
///
/// Every field is optional and unknown fields (a client-sent `id` among them)
/// are ignored, and an explicit `null` reads the same as an absent field. No
/// further validation happens after deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NewTodo {
    pub fn into_todo(self, id: i64) -> Todo {
        Todo {
            id,
            title: self.title,
            desc: self.desc,
            done: self.done,
        }
    }
}

impl Todo {
    /// Flips the completion flag. This is the only mutation a stored todo supports.
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}
