//! Namespaced cache keys.
//!
//! ```text
//! todos:user:<username>   collection of an owner's todos
//! todo:<id>               single todo item
//! ```

use std::fmt::Display;

const COLLECTION_PREFIX: &str = "todos:user:";
const ITEM_PREFIX: &str = "todo:";

/// Key for an owner's whole todo collection.
pub fn collection_key(owner_id: &str) -> String {
    format!("{COLLECTION_PREFIX}{owner_id}")
}

/// Key for a single todo.
pub fn item_key(id: impl Display) -> String {
    format!("{ITEM_PREFIX}{id}")
}

/// Pattern matching every collection key.
pub fn all_collections_pattern() -> String {
    format!("{COLLECTION_PREFIX}*")
}

/// Pattern matching every item key.
pub fn all_items_pattern() -> String {
    format!("{ITEM_PREFIX}*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(collection_key("johnd"), "todos:user:johnd");
        assert_eq!(item_key(42u64), "todo:42");
        assert_eq!(item_key("7"), "todo:7");
        assert_eq!(all_collections_pattern(), "todos:user:*");
        assert_eq!(all_items_pattern(), "todo:*");
    }

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(collection_key("admin"), collection_key("admin"));
        assert_ne!(collection_key("admin"), collection_key("janed"));
    }
}
