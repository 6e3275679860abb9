//! Opaque page tokens.
//!
//! A token is the complete resumable position of a listing: which fields it
//! is ordered by, in which direction, the sort and key values of the next
//! row to return, and the filter in effect. It is serialized to JSON and
//! base64-encoded, so no server-side state is needed to resume a listing.

use std::str::FromStr;

use base64::prelude::*;
use keyset_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_TOKEN;
use crate::filter::Filter;
use crate::query::SortOrder;

/// Message surfaced for every malformed page token.
pub(crate) const INVALID_TOKEN_MESSAGE: &str = "invalid page token";

/// The sort and key values of the row a listing resumes at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenPosition {
    /// Value of the sort field.
    pub sort_value: Value,
    /// Value of the primary key.
    pub key_value: Value,
}

/// A resumable query position.
///
/// A token without a position describes the first page of a listing; with
/// one, it describes where a subsequent page starts. Sort and key values
/// are always present or absent together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageToken {
    sort_field: String,
    key_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<TokenPosition>,
    #[serde(default)]
    is_desc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
}

impl PageToken {
    /// Creates a first-page token ordered by `sort_field` then `key_field`.
    pub fn new(
        sort_field: impl Into<String>,
        key_field: impl Into<String>,
        order: SortOrder,
    ) -> Self {
        Self {
            sort_field: sort_field.into(),
            key_field: key_field.into(),
            position: None,
            is_desc: order.is_desc(),
            filter: None,
        }
    }

    /// Sets the position the listing resumes at.
    pub fn with_position(mut self, sort_value: Value, key_value: Value) -> Self {
        self.position = Some(TokenPosition {
            sort_value,
            key_value,
        });
        self
    }

    /// Sets the filter in effect.
    pub fn with_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Internal name of the sort field.
    #[inline]
    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    /// Sort value of the row to resume at.
    #[inline]
    pub fn sort_value(&self) -> Option<&Value> {
        self.position.as_ref().map(|p| &p.sort_value)
    }

    /// Internal name of the primary key field.
    #[inline]
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Primary key value of the row to resume at.
    #[inline]
    pub fn key_value(&self) -> Option<&Value> {
        self.position.as_ref().map(|p| &p.key_value)
    }

    #[inline]
    pub fn position(&self) -> Option<&TokenPosition> {
        self.position.as_ref()
    }

    #[inline]
    pub fn is_desc(&self) -> bool {
        self.is_desc
    }

    #[inline]
    pub fn order(&self) -> SortOrder {
        SortOrder::from_desc(self.is_desc)
    }

    #[inline]
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Serializes the token into an opaque string.
    ///
    /// Fails with an internal error if serialization fails, which only
    /// happens for values JSON cannot express (non-finite floats).
    pub fn encode(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self).map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_TOKEN,
                error = %err,
                sort_field = %self.sort_field,
                "Failed to serialize page token"
            );
            Error::internal_error()
                .with_message("failed to serialize page token")
                .with_source(err)
        })?;

        Ok(BASE64_STANDARD.encode(bytes))
    }

    /// Parses a token produced by [`encode`].
    ///
    /// Any malformed input fails with invalid input and the fixed message
    /// "invalid page token"; the underlying decode error is kept only as
    /// the error source.
    ///
    /// [`encode`]: PageToken::encode
    pub fn decode(page_token: &str) -> Result<Self> {
        let bytes = BASE64_STANDARD
            .decode(page_token)
            .map_err(|err| invalid_token(err, "base64"))?;

        serde_json::from_slice(&bytes).map_err(|err| invalid_token(err, "json"))
    }
}

fn invalid_token(err: impl std::error::Error + Send + Sync + 'static, stage: &str) -> Error {
    tracing::warn!(
        target: TRACING_TARGET_TOKEN,
        error = %err,
        stage,
        "Rejected page token"
    );
    Error::invalid_input()
        .with_message(INVALID_TOKEN_MESSAGE)
        .with_source(err)
}

impl FromStr for PageToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use keyset_core::ErrorKind;
    use uuid::Uuid;

    use super::*;
    use crate::filter::{FilterOperator, FilterSpec};
    use crate::list::FieldMap;

    fn round_trip(token: &PageToken) -> PageToken {
        PageToken::decode(&token.encode().unwrap()).unwrap()
    }

    #[test]
    fn first_page_token_round_trips() {
        let token = PageToken::new("name", "id", SortOrder::Asc);
        let back = round_trip(&token);
        assert_eq!(back, token);
        assert!(back.position().is_none());
        assert!(back.sort_value().is_none() && back.key_value().is_none());
    }

    #[test]
    fn scalar_kinds_are_preserved() {
        let ts: Timestamp = "2024-05-01T08:00:00Z".parse().unwrap();
        let id = Uuid::now_v7();

        let cases = [
            (Value::Int(10), Value::Int(2)),
            (Value::from("10"), Value::from("2")),
            (Value::Float(1.5), Value::Uuid(id)),
            (Value::Timestamp(ts), Value::Int(7)),
            (Value::Bool(true), Value::from("k")),
        ];

        for (sort_value, key_value) in cases {
            let token = PageToken::new("f", "id", SortOrder::Desc)
                .with_position(sort_value.clone(), key_value.clone());
            let back = round_trip(&token);
            assert_eq!(back.sort_value(), Some(&sort_value));
            assert_eq!(back.key_value(), Some(&key_value));
            assert_eq!(back, token);
        }
    }

    #[test]
    fn awkward_floats_round_trip_exactly() {
        let cases = [
            0.1,
            -0.0,
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
            f64::EPSILON,
            f64::from_bits(1),
            f64::from_bits(0x000f_ffff_ffff_ffff),
            1.0715660391465826e-75,
        ];

        for value in cases {
            let token = PageToken::new("score", "id", SortOrder::Asc)
                .with_position(Value::Float(value), Value::Int(1));
            let back = round_trip(&token);
            assert_eq!(back, token, "float {value:e} changed");
            match back.sort_value() {
                Some(Value::Float(v)) => assert_eq!(v.to_bits(), value.to_bits()),
                other => panic!("unexpected sort value {other:?}"),
            }
        }
    }

    #[test]
    fn float_bit_patterns_round_trip_exactly() {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut checked = 0;

        while checked < 20_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;

            let value = f64::from_bits(state);
            if !value.is_finite() {
                continue;
            }

            let token = PageToken::new("score", "id", SortOrder::Desc)
                .with_position(Value::Float(value), Value::Float(-value));
            let back = round_trip(&token);
            match (back.sort_value(), back.key_value()) {
                (Some(Value::Float(sort)), Some(Value::Float(key))) => {
                    assert_eq!(sort.to_bits(), value.to_bits(), "float {value:e} changed");
                    assert_eq!(key.to_bits(), (-value).to_bits(), "float {:e} changed", -value);
                }
                other => panic!("unexpected position {other:?}"),
            }
            checked += 1;
        }
    }

    #[test]
    fn nanosecond_timestamp_round_trips() {
        let ts: Timestamp = "2024-05-01T08:00:00.123456789Z".parse().unwrap();
        let token = PageToken::new("created_at", "id", SortOrder::Asc)
            .with_position(Value::Timestamp(ts), Value::Int(3));
        assert_eq!(round_trip(&token).sort_value(), Some(&Value::Timestamp(ts)));
    }

    #[test]
    fn filter_round_trips() {
        const FIELDS: FieldMap = FieldMap::new(&[("status", "status")]);
        let spec = FilterSpec::new().with_predicate("status", FilterOperator::Equals, "done");
        let filter = Filter::compile(&spec, FIELDS).unwrap();

        let token = PageToken::new("created_at", "id", SortOrder::Asc)
            .with_position(Value::Int(1), Value::Int(1))
            .with_filter(Some(filter.clone()));

        assert_eq!(round_trip(&token).filter(), Some(&filter));
    }

    #[test]
    fn encoding_is_deterministic() {
        let token = PageToken::new("name", "id", SortOrder::Asc)
            .with_position(Value::from("b"), Value::Int(4));
        assert_eq!(token.encode().unwrap(), token.encode().unwrap());
    }

    #[test]
    fn rejects_bad_base64() {
        let err = PageToken::decode("not base64!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.public_message(), "invalid page token");
    }

    #[test]
    fn rejects_wrong_shape() {
        let encoded = BASE64_STANDARD.encode(r#"{"hello":"world"}"#);
        let err = PageToken::decode(&encoded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.public_message(), "invalid page token");
    }

    #[test]
    fn rejects_half_position() {
        let json = r#"{"sort_field":"name","key_field":"id","position":{"sort_value":{"int":1}}}"#;
        let encoded = BASE64_STANDARD.encode(json);
        assert!(PageToken::decode(&encoded).is_err());
    }

    #[test]
    fn non_finite_float_is_internal_error() {
        let token = PageToken::new("score", "id", SortOrder::Asc)
            .with_position(Value::Float(f64::INFINITY), Value::Int(1));
        let err = token.encode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert_eq!(err.public_message(), "internal server error");
    }

    #[test]
    fn nan_position_is_internal_error() {
        let token = PageToken::new("score", "id", SortOrder::Asc)
            .with_position(Value::Float(f64::NAN), Value::Int(1));
        let err = token.encode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
    }

    #[test]
    fn non_finite_filter_value_is_internal_error() {
        const FIELDS: FieldMap = FieldMap::new(&[("score", "score")]);
        let spec = FilterSpec::new().with_predicate(
            "score",
            FilterOperator::GreaterThan,
            Value::Float(f64::NEG_INFINITY),
        );
        let filter = Filter::compile(&spec, FIELDS).unwrap();

        let token = PageToken::new("score", "id", SortOrder::Asc)
            .with_position(Value::Float(2.5), Value::Int(1))
            .with_filter(Some(filter));
        let err = token.encode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
    }

    #[test]
    fn parses_via_from_str() {
        let token = PageToken::new("name", "id", SortOrder::Desc);
        let parsed: PageToken = token.encode().unwrap().parse().unwrap();
        assert_eq!(parsed.order(), SortOrder::Desc);
    }
}
