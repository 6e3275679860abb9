//! The capability a record type provides to take part in list queries.

use keyset_core::Value;

/// A static mapping from API field names to internal field names.
///
/// Only fields present in the map can be sorted or filtered on by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap(&'static [(&'static str, &'static str)]);

impl FieldMap {
    /// Creates a field map from `(api_name, internal_name)` pairs.
    #[inline]
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self(entries)
    }

    /// Resolves an API field name to its internal name.
    pub fn get(&self, api_name: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(api, _)| *api == api_name)
            .map(|(_, internal)| *internal)
    }

    /// Returns whether the API field name is known.
    #[inline]
    pub fn contains(&self, api_name: &str) -> bool {
        self.get(api_name).is_some()
    }

    /// Returns whether any API field maps to this internal name.
    pub fn contains_internal(&self, internal_name: &str) -> bool {
        self.0.iter().any(|(_, internal)| *internal == internal_name)
    }

    /// Iterates over `(api_name, internal_name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.0.iter().copied()
    }
}

/// Implemented by any record type that supports list queries.
///
/// Field names returned here, and keys passed to [`field_value`], are the
/// internal names: the same identifiers used as query columns.
///
/// ## Example
///
/// ```rust
/// use keyset_core::Value;
/// use keyset_postgres::list::{FieldMap, Listable};
///
/// struct Job {
///     id: i64,
///     name: String,
/// }
///
/// impl Listable for Job {
///     fn primary_key_field() -> &'static str {
///         "id"
///     }
///
///     fn default_sort_field() -> &'static str {
///         "name"
///     }
///
///     fn field_map() -> FieldMap {
///         FieldMap::new(&[("id", "id"), ("name", "name")])
///     }
///
///     fn field_value(&self, field: &str) -> Option<Value> {
///         match field {
///             "id" => Some(self.id.into()),
///             "name" => Some(self.name.as_str().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
///
/// [`field_value`]: Listable::field_value
pub trait Listable {
    /// Internal name of the primary key, used to break ties between rows
    /// with equal sort values.
    fn primary_key_field() -> &'static str;

    /// Internal name of the field sorted on when the caller names none.
    fn default_sort_field() -> &'static str;

    /// Fields callers may sort and filter on.
    fn field_map() -> FieldMap;

    /// Reads the current value of an internal field off this record.
    fn field_value(&self, field: &str) -> Option<Value>;

    /// Name of the record type, used in diagnostics.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
