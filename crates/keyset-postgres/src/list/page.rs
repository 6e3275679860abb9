//! A page of list results.

use keyset_core::Result;
use serde::{Deserialize, Serialize};

use super::{ListOptions, Listable};

/// Result of a keyset-paginated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Token to fetch the next page. Present only when more items exist.
    pub next_page_token: Option<String>,
}

impl<T: Listable> Page<T> {
    /// Creates a page from rows fetched with [`ListOptions::apply_to`].
    ///
    /// If more rows than the page size came back, the first extra row is
    /// where the next page starts: its values become the next page token and
    /// it is dropped from the items.
    pub fn new(mut rows: Vec<T>, options: &ListOptions) -> Result<Self> {
        let page_size = options.page_size() as usize;

        let next_page_token = match rows.get(page_size) {
            Some(lookahead) => Some(options.next_page_token(lookahead)?),
            None => None,
        };

        rows.truncate(page_size);

        Ok(Self {
            items: rows,
            next_page_token,
        })
    }
}

impl<T> Page<T> {
    /// Creates an empty final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }

    /// Returns true if there are more items to fetch.
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}
