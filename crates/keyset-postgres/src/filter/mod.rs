//! Filtering for list queries.
//!
//! Callers send a [`FilterSpec`] keyed by API field names. It is compiled
//! against the listed type's [`FieldMap`] into a [`Filter`], which contributes
//! `AND`-ed predicates to the query and is carried inside page tokens so
//! every page of a listing stays filtered the same way.
//!
//! [`FieldMap`]: crate::list::FieldMap

mod compiled;
mod spec;

pub use compiled::Filter;
pub use spec::{FilterOperator, FilterPredicate, FilterSpec, FilterValue};
