//! Predicate expressions.

use keyset_core::Value;

/// A boolean predicate over named columns.
///
/// Column names are internal (storage) identifiers. Rendering quotes them,
/// so they never need to be trusted.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column = value`
    Eq(String, Value),
    /// `column <> value`
    NotEq(String, Value),
    /// `column > value`
    Gt(String, Value),
    /// `column >= value`
    GtOrEq(String, Value),
    /// `column < value`
    Lt(String, Value),
    /// `column <= value`
    LtOrEq(String, Value),
    /// `column IN (values...)`; always false when empty.
    In(String, Vec<Value>),
    /// `column` contains the given substring.
    Contains(String, String),
    /// Conjunction; always true when empty.
    And(Vec<Expr>),
    /// Disjunction; always false when empty.
    Or(Vec<Expr>),
}

impl Expr {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn not_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEq(column.into(), value.into())
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(column.into(), value.into())
    }

    pub fn gt_or_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::GtOrEq(column.into(), value.into())
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(column.into(), value.into())
    }

    pub fn lt_or_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::LtOrEq(column.into(), value.into())
    }

    /// Combines two predicates with `AND`.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Self::And(mut items) => {
                items.push(other);
                Self::And(items)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Combines two predicates with `OR`.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Self::Or(mut items) => {
                items.push(other);
                Self::Or(items)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Appends the SQL for this predicate to `sql`, pushing bind values in
    /// placeholder order.
    pub(crate) fn render(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::Eq(column, value) => render_cmp(sql, binds, column, "=", value),
            Self::NotEq(column, value) => render_cmp(sql, binds, column, "<>", value),
            Self::Gt(column, value) => render_cmp(sql, binds, column, ">", value),
            Self::GtOrEq(column, value) => render_cmp(sql, binds, column, ">=", value),
            Self::Lt(column, value) => render_cmp(sql, binds, column, "<", value),
            Self::LtOrEq(column, value) => render_cmp(sql, binds, column, "<=", value),
            Self::In(_, values) if values.is_empty() => sql.push_str("FALSE"),
            Self::In(column, values) => {
                sql.push_str(&quote_ident(column));
                sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    push_bind(sql, binds, value.clone());
                }
                sql.push(')');
            }
            Self::Contains(column, needle) => {
                sql.push_str(&quote_ident(column));
                sql.push_str(" LIKE ");
                let pattern = format!("%{}%", escape_like(needle));
                push_bind(sql, binds, Value::String(pattern));
            }
            Self::And(items) => render_group(sql, binds, items, " AND ", "TRUE"),
            Self::Or(items) => render_group(sql, binds, items, " OR ", "FALSE"),
        }
    }
}

fn render_cmp(sql: &mut String, binds: &mut Vec<Value>, column: &str, op: &str, value: &Value) {
    sql.push_str(&quote_ident(column));
    sql.push(' ');
    sql.push_str(op);
    sql.push(' ');
    push_bind(sql, binds, value.clone());
}

fn render_group(sql: &mut String, binds: &mut Vec<Value>, items: &[Expr], sep: &str, empty: &str) {
    if items.is_empty() {
        sql.push_str(empty);
        return;
    }

    sql.push('(');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        item.render(sql, binds);
    }
    sql.push(')');
}

fn push_bind(sql: &mut String, binds: &mut Vec<Value>, value: Value) {
    binds.push(value);
    sql.push('$');
    sql.push_str(&binds.len().to_string());
}

/// Quotes a possibly qualified identifier (`table.column`), doubling any
/// embedded double quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
