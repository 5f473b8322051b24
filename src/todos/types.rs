//! Todo records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub content: String,
}

/// Everything the primary store holds for one owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoList {
    pub items: BTreeMap<u64, Todo>,
    /// Id the next created todo receives.
    pub next_id: u64,
}

impl TodoList {
    /// Starter list given to owners seen for the first time.
    pub fn seeded() -> Self {
        let items = [
            (1, "Create new todo"),
            (2, "Update me"),
            (3, "Delete example ones"),
        ]
        .into_iter()
        .map(|(id, content)| {
            (
                id,
                Todo {
                    id,
                    content: content.to_string(),
                },
            )
        })
        .collect();

        Self { items, next_id: 4 }
    }

    /// Append a todo, assigning it the next id.
    pub fn push(&mut self, content: impl Into<String>) -> Todo {
        let todo = Todo {
            id: self.next_id,
            content: content.into(),
        };
        self.items.insert(todo.id, todo.clone());
        self.next_id += 1;
        todo
    }

    pub fn remove(&mut self, id: u64) -> Option<Todo> {
        self.items.remove(&id)
    }

    /// Items ordered by id.
    pub fn to_vec(&self) -> Vec<Todo> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_list() {
        let list = TodoList::seeded();
        assert_eq!(list.items.len(), 3);
        assert_eq!(list.next_id, 4);
        assert_eq!(list.to_vec()[0].content, "Create new todo");
    }

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut list = TodoList::seeded();
        let a = list.push("a");
        let b = list.push("b");
        assert_eq!((a.id, b.id), (4, 5));
        assert_eq!(list.next_id, 6);

        // Ids are never reused after removal.
        list.remove(5);
        assert_eq!(list.push("c").id, 6);
    }

    #[test]
    fn test_json_round_trip_keeps_integer_keys() {
        let list = TodoList::seeded();
        let json = serde_json::to_string(&list).unwrap();
        let back: TodoList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
