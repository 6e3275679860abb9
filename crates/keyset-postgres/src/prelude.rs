//! Convenient re-exports for common use.

pub use keyset_core::prelude::*;

pub use crate::filter::{Filter, FilterOperator, FilterSpec, FilterValue};
pub use crate::list::{FieldMap, ListOptions, Listable, Page, PageSizePolicy, PageToken};
pub use crate::query::{Expr, SelectBuilder, SelectQuery, SortOrder};
