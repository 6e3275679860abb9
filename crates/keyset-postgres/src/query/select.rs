//! Postgres `SELECT` statement builder.

use keyset_core::Value;

use super::expr::quote_ident;
use super::{Expr, SortOrder};
use crate::TRACING_TARGET_QUERY;

/// A query that pagination and filtering can contribute clauses to.
///
/// Every method consumes the query and returns the extended one, so a
/// builder shared between requests is never mutated in place.
pub trait SelectQuery: Sized {
    /// Adds a predicate. Multiple predicates are combined with `AND`.
    #[must_use]
    fn filter(self, predicate: Expr) -> Self;

    /// Appends an ordering clause after any existing ones.
    #[must_use]
    fn order_by(self, column: &str, order: SortOrder) -> Self;

    /// Sets the maximum number of rows returned.
    #[must_use]
    fn limit(self, limit: u64) -> Self;
}

/// A single `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    /// Internal column name.
    pub column: String,
    /// Direction.
    pub order: SortOrder,
}

/// Builds a parameterized Postgres `SELECT` statement.
///
/// ## Example
///
/// ```rust
/// use keyset_postgres::query::{Expr, SelectBuilder, SelectQuery, SortOrder};
///
/// let (sql, binds) = SelectBuilder::new("jobs")
///     .filter(Expr::eq("status", "done"))
///     .order_by("created_at", SortOrder::Desc)
///     .limit(21)
///     .to_sql();
///
/// assert_eq!(
///     sql,
///     "SELECT * FROM \"jobs\" WHERE \"status\" = $1 ORDER BY \"created_at\" DESC LIMIT 21"
/// );
/// assert_eq!(binds.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use = "query builders do nothing until rendered"]
pub struct SelectBuilder {
    table: String,
    columns: Vec<String>,
    predicates: Vec<Expr>,
    order: Vec<OrderTerm>,
    limit: Option<u64>,
}

impl SelectBuilder {
    /// Creates a `SELECT *` over the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restricts the selected columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the predicates added so far.
    #[inline]
    pub fn predicates(&self) -> &[Expr] {
        &self.predicates
    }

    /// Returns the ordering terms added so far.
    #[inline]
    pub fn order(&self) -> &[OrderTerm] {
        &self.order
    }

    /// Returns the row limit, if one was set.
    #[inline]
    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Renders the statement and its bind values.
    ///
    /// Placeholders are numbered `$1..$n` in the order the values appear in
    /// the returned vector.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT ");
        let mut binds = Vec::new();

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            let columns: Vec<_> = self.columns.iter().map(|c| quote_ident(c)).collect();
            sql.push_str(&columns.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&quote_ident(&self.table));

        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            predicate.render(&mut sql, &mut binds);
        }

        for (i, term) in self.order.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            sql.push_str(&quote_ident(&term.column));
            sql.push(' ');
            sql.push_str(term.order.as_sql());
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }

        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            sql = %sql,
            binds = binds.len(),
            "Rendered select statement"
        );

        (sql, binds)
    }
}

impl SelectQuery for SelectBuilder {
    fn filter(mut self, predicate: Expr) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order.push(OrderTerm {
            column: column.to_owned(),
            order,
        });
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_select() {
        let (sql, binds) = SelectBuilder::new("jobs").to_sql();
        assert_eq!(sql, "SELECT * FROM \"jobs\"");
        assert!(binds.is_empty());
    }

    #[test]
    fn predicates_are_and_combined_with_running_placeholders() {
        let (sql, binds) = SelectBuilder::new("jobs")
            .columns(["id", "name"])
            .filter(Expr::eq("namespace", "default"))
            .filter(Expr::gt("created_at", 10).or(Expr::lt("id", 5)))
            .to_sql();

        assert_eq!(
            sql,
            "SELECT \"id\", \"name\" FROM \"jobs\" WHERE \"namespace\" = $1 \
             AND (\"created_at\" > $2 OR \"id\" < $3)"
        );
        assert_eq!(
            binds,
            vec![Value::from("default"), Value::Int(10), Value::Int(5)]
        );
    }

    #[test]
    fn order_and_limit() {
        let query = SelectBuilder::new("jobs")
            .order_by("created_at", SortOrder::Desc)
            .order_by("id", SortOrder::Desc)
            .limit(3);

        assert_eq!(query.row_limit(), Some(3));
        assert_eq!(query.order().len(), 2);
        assert_eq!(
            query.to_sql().0,
            "SELECT * FROM \"jobs\" ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT 3"
        );
    }

    #[test]
    fn builder_is_not_mutated_by_extension() {
        let base = SelectBuilder::new("jobs").filter(Expr::eq("a", 1));
        let extended = base.clone().limit(5);
        assert_eq!(base.row_limit(), None);
        assert_eq!(extended.row_limit(), Some(5));
        assert_eq!(base.predicates(), extended.predicates());
    }
}
