//! Keyset pagination for list queries.
//!
//! A first-page request is turned into [`ListOptions`] from its sort and
//! filter criteria; every later request carries an opaque page token and
//! its options are decoded from that token alone. The options extend a
//! [`SelectQuery`] with the keyset boundary, a `(sort, primary key)`
//! ordering and a limit of one row past the page size. [`Page::new`] then
//! trims the lookahead row and turns it into the next page token.
//!
//! ```rust
//! use keyset_core::Value;
//! use keyset_postgres::list::{FieldMap, ListOptions, Listable};
//! use keyset_postgres::query::SelectBuilder;
//!
//! struct Job {
//!     id: i64,
//!     created_at: i64,
//! }
//!
//! impl Listable for Job {
//!     fn primary_key_field() -> &'static str {
//!         "id"
//!     }
//!
//!     fn default_sort_field() -> &'static str {
//!         "created_at"
//!     }
//!
//!     fn field_map() -> FieldMap {
//!         FieldMap::new(&[("id", "id"), ("created_at", "created_at")])
//!     }
//!
//!     fn field_value(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "id" => Some(self.id.into()),
//!             "created_at" => Some(self.created_at.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let options = ListOptions::from_criteria::<Job>(2, "created_at desc", None)?;
//! let (sql, _) = options.apply_to(SelectBuilder::new("jobs")).to_sql();
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM \"jobs\" ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT 3"
//! );
//! # Ok::<(), keyset_core::Error>(())
//! ```
//!
//! [`SelectQuery`]: crate::query::SelectQuery

mod listable;
mod options;
mod page;
mod page_size;
mod token;


pub use listable::{FieldMap, Listable};
pub use options::ListOptions;
pub use page::Page;
pub use page_size::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageSizePolicy, normalize_page_size};
pub use token::{PageToken, TokenPosition};
