//! Filter specification as received from API callers.

use keyset_core::Value;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::AsRefStr;

/// Comparison applied by a single filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    /// Field value is one of a list of values.
    In,
    /// Field value contains the given string.
    IsSubstring,
}

/// Operand of a filter predicate: a single value, or a list for
/// [`FilterOperator::In`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum FilterValue {
    Single(Value),
    List(Vec<Value>),
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<Value>> for FilterValue {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Single(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Single(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Single(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Single(value.into())
    }
}

impl<T: Into<Value>> FromIterator<T> for FilterValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

/// One `key op value` condition, keyed by API field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FilterPredicate {
    /// API field name.
    pub key: String,
    /// Comparison to apply.
    pub op: FilterOperator,
    /// Operand.
    pub value: FilterValue,
}

/// A conjunction of predicates supplied by the caller of a list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FilterSpec {
    /// Predicates that must all hold.
    #[serde(default)]
    pub predicates: Vec<FilterPredicate>,
}

impl FilterSpec {
    /// Creates a new empty filter specification.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate.
    #[inline]
    pub fn with_predicate(
        mut self,
        key: impl Into<String>,
        op: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.predicates.push(FilterPredicate {
            key: key.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Returns whether no predicate is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
