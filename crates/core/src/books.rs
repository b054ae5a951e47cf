//! Book de-duplication for imports and search results.

use std::collections::HashSet;

use crate::item::{Item, ItemCategory};

/// Normalized `(title, author)` identity of a book.
pub fn book_key(title: &str, author: Option<&str>) -> (String, String) {
    (
        title.trim().to_lowercase(),
        author.unwrap_or_default().trim().to_lowercase(),
    )
}

/// Drop repeated books, keeping the first occurrence of each title/author
/// pair. Non-book items pass through untouched and order is preserved.
pub fn dedupe_books(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            if item.category != ItemCategory::Book {
                return true;
            }
            let author = item.metadata.as_ref().and_then(|m| m.author());
            seen.insert(book_key(&item.name, author))
        })
        .collect()
}
