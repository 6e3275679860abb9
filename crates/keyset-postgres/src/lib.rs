#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for page token encoding and decoding.
///
/// Use this target for logging rejected tokens and serialization failures.
pub const TRACING_TARGET_TOKEN: &str = "keyset_postgres::token";

/// Tracing target for list option construction and next-token derivation.
pub const TRACING_TARGET_OPTIONS: &str = "keyset_postgres::options";

/// Tracing target for filter compilation.
pub const TRACING_TARGET_FILTER: &str = "keyset_postgres::filter";

/// Tracing target for statement rendering.
pub const TRACING_TARGET_QUERY: &str = "keyset_postgres::query";

pub mod filter;
pub mod list;
pub mod query;

pub mod prelude;

pub use keyset_core::{Error, ErrorKind, Result, Value};
