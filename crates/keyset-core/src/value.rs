//! Scalar values carried by page tokens and query predicates.

use std::cmp::Ordering;
use std::fmt;

use derive_more::From;
use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use strum::IntoStaticStr;
use uuid::Uuid;

/// A scalar field value.
///
/// The serialized form is externally tagged (`{"int": 7}`,
/// `{"string": "7"}`), so the kind of the value survives a trip through
/// JSON unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From, IntoStaticStr)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Value {
    /// Signed integer.
    Int(i64),
    /// Floating-point number. Must be finite to be serialized.
    Float(
        #[serde(serialize_with = "serialize_finite")]
        #[cfg_attr(feature = "schema", schemars(with = "f64"))]
        f64,
    ),
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Instant in time.
    Timestamp(Timestamp),
    /// UUID, typically a primary key.
    Uuid(Uuid),
}

impl Value {
    /// Returns the name of this value's kind.
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }

    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Values of different kinds are unordered and return `None`, as do
    /// floats involving `NaN`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// JSON has no representation for `NaN` or infinities, and `serde_json`
/// would silently write them as `null`.
fn serialize_finite<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(serde::ser::Error::custom(format!(
            "cannot serialize non-finite float {value}"
        )));
    }

    serializer.serialize_f64(*value)
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
        }
    }
}
