//! Query-building primitives that pagination and filtering contribute to.
//!
//! [`SelectQuery`] is the seam: pagination and filters only ever add
//! predicates, ordering terms and a limit through it. [`SelectBuilder`] is
//! the Postgres implementation, rendering a statement with `$n` bind
//! placeholders.

mod expr;
mod select;
mod sort;

pub use expr::Expr;
pub use select::{OrderTerm, SelectBuilder, SelectQuery};
pub use sort::SortOrder;
