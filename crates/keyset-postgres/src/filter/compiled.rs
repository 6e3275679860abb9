//! Filters compiled against a record type's field map.

use keyset_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};

use super::{FilterOperator, FilterPredicate, FilterSpec, FilterValue};
use crate::TRACING_TARGET_FILTER;
use crate::list::FieldMap;
use crate::query::{Expr, SelectQuery};

/// A single predicate over an internal field.
///
/// Each variant carries exactly the operand shape its comparison needs, so
/// a compiled filter can always be turned into a query predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Predicate {
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    GreaterThan { field: String, value: Value },
    GreaterThanEquals { field: String, value: Value },
    LessThan { field: String, value: Value },
    LessThanEquals { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    IsSubstring { field: String, substring: String },
}

impl Predicate {
    fn compile(predicate: &FilterPredicate, fields: FieldMap) -> Result<Self> {
        let field = fields
            .get(&predicate.key)
            .ok_or_else(|| {
                Error::invalid_input()
                    .with_message(format!("invalid filter field: {:?}", predicate.key))
            })?
            .to_owned();

        let op = predicate.op;
        let expected = |what| operand_error(&predicate.key, op, what);

        Ok(match (op, predicate.value.clone()) {
            (FilterOperator::In, FilterValue::List(values)) => Self::In { field, values },
            (FilterOperator::In, FilterValue::Single(_)) => {
                return Err(expected("a list of values"));
            }
            (_, FilterValue::List(_)) => return Err(expected("a single value")),
            (FilterOperator::IsSubstring, FilterValue::Single(Value::String(substring))) => {
                Self::IsSubstring { field, substring }
            }
            (FilterOperator::IsSubstring, FilterValue::Single(_)) => {
                return Err(expected("a string"));
            }
            (FilterOperator::Equals, FilterValue::Single(value)) => Self::Equals { field, value },
            (FilterOperator::NotEquals, FilterValue::Single(value)) => {
                Self::NotEquals { field, value }
            }
            (FilterOperator::GreaterThan, FilterValue::Single(value)) => {
                Self::GreaterThan { field, value }
            }
            (FilterOperator::GreaterThanEquals, FilterValue::Single(value)) => {
                Self::GreaterThanEquals { field, value }
            }
            (FilterOperator::LessThan, FilterValue::Single(value)) => {
                Self::LessThan { field, value }
            }
            (FilterOperator::LessThanEquals, FilterValue::Single(value)) => {
                Self::LessThanEquals { field, value }
            }
        })
    }

    fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. }
            | Self::NotEquals { field, .. }
            | Self::GreaterThan { field, .. }
            | Self::GreaterThanEquals { field, .. }
            | Self::LessThan { field, .. }
            | Self::LessThanEquals { field, .. }
            | Self::In { field, .. }
            | Self::IsSubstring { field, .. } => field,
        }
    }

    fn to_expr(&self) -> Expr {
        match self {
            Self::Equals { field, value } => Expr::Eq(field.clone(), value.clone()),
            Self::NotEquals { field, value } => Expr::NotEq(field.clone(), value.clone()),
            Self::GreaterThan { field, value } => Expr::Gt(field.clone(), value.clone()),
            Self::GreaterThanEquals { field, value } => Expr::GtOrEq(field.clone(), value.clone()),
            Self::LessThan { field, value } => Expr::Lt(field.clone(), value.clone()),
            Self::LessThanEquals { field, value } => Expr::LtOrEq(field.clone(), value.clone()),
            Self::In { field, values } => Expr::In(field.clone(), values.clone()),
            Self::IsSubstring { field, substring } => {
                Expr::Contains(field.clone(), substring.clone())
            }
        }
    }
}

fn operand_error(key: &str, op: FilterOperator, expected: &str) -> Error {
    Error::invalid_input().with_message(format!(
        "filter on {key:?} with operator {:?} expects {expected}",
        op.as_ref()
    ))
}

/// A filter whose field names have been resolved to internal names.
///
/// Filters are serializable so that they can travel inside a page token and
/// keep constraining every subsequent page of a listing.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Compiles a caller-supplied specification against a field map.
    ///
    /// Fails with invalid input if a key is not in the map or an operand
    /// has the wrong shape for its operator.
    pub fn compile(spec: &FilterSpec, fields: FieldMap) -> Result<Self> {
        let predicates = spec
            .predicates
            .iter()
            .map(|predicate| Predicate::compile(predicate, fields))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| {
                tracing::debug!(
                    target: TRACING_TARGET_FILTER,
                    error = %err,
                    "Rejected filter specification"
                );
            })?;

        Ok(Self { predicates })
    }

    /// Returns the number of predicates.
    #[inline]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns whether the filter has no predicates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Iterates over the internal field names the filter constrains.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(Predicate::field)
    }

    /// Adds this filter's predicates to the query.
    ///
    /// Only predicates are added; ordering and limit are left untouched.
    pub fn apply_to<Q: SelectQuery>(&self, query: Q) -> Q {
        self.predicates
            .iter()
            .fold(query, |query, predicate| query.filter(predicate.to_expr()))
    }
}

#[cfg(test)]
mod tests {
    use keyset_core::ErrorKind;

    use super::*;
    use crate::query::SelectBuilder;

    const FIELDS: FieldMap = FieldMap::new(&[
        ("name", "name"),
        ("status", "status"),
        ("created_at", "created_at_secs"),
    ]);

    #[test]
    fn compiles_to_internal_names() {
        let spec = FilterSpec::new()
            .with_predicate("created_at", FilterOperator::GreaterThanEquals, 100)
            .with_predicate("name", FilterOperator::IsSubstring, "etl");

        let filter = Filter::compile(&spec, FIELDS).unwrap();
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.fields().collect::<Vec<_>>(), ["created_at_secs", "name"]);

        let (sql, binds) = filter.apply_to(SelectBuilder::new("jobs")).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"jobs\" WHERE \"created_at_secs\" >= $1 AND \"name\" LIKE $2"
        );
        assert_eq!(binds, vec![Value::Int(100), Value::from("%etl%")]);
    }

    #[test]
    fn in_operator_requires_list() {
        let spec = FilterSpec::new().with_predicate("status", FilterOperator::In, "done");
        let err = Filter::compile(&spec, FIELDS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let spec = FilterSpec::new().with_predicate(
            "status",
            FilterOperator::In,
            vec![Value::from("done"), Value::from("failed")],
        );
        let filter = Filter::compile(&spec, FIELDS).unwrap();
        let (sql, _) = filter.apply_to(SelectBuilder::new("jobs")).to_sql();
        assert_eq!(sql, "SELECT * FROM \"jobs\" WHERE \"status\" IN ($1, $2)");
    }

    #[test]
    fn list_operand_rejected_for_scalar_operators() {
        let spec = FilterSpec::new().with_predicate(
            "name",
            FilterOperator::Equals,
            vec![Value::from("a")],
        );
        assert!(Filter::compile(&spec, FIELDS).is_err());
    }

    #[test]
    fn substring_requires_string() {
        let spec = FilterSpec::new().with_predicate("name", FilterOperator::IsSubstring, 5);
        let err = Filter::compile(&spec, FIELDS).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn unknown_field_is_invalid_input() {
        let spec = FilterSpec::new().with_predicate("secret", FilterOperator::Equals, "x");
        let err = Filter::compile(&spec, FIELDS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.public_message().contains("secret"));
    }

    #[test]
    fn applying_leaves_order_and_limit_alone() {
        let spec = FilterSpec::new().with_predicate("status", FilterOperator::NotEquals, "x");
        let filter = Filter::compile(&spec, FIELDS).unwrap();
        let query = filter.apply_to(SelectBuilder::new("jobs"));
        assert!(query.order().is_empty());
        assert_eq!(query.row_limit(), None);
    }

    #[test]
    fn serialized_form_round_trips() {
        let spec = FilterSpec::new()
            .with_predicate("status", FilterOperator::In, vec![Value::from("done")])
            .with_predicate("created_at", FilterOperator::LessThan, 7);
        let filter = Filter::compile(&spec, FIELDS).unwrap();

        let json = serde_json::to_string(&filter).unwrap();
        let back: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filter);
    }
}
