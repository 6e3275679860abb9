//! Page size policy.

#[cfg(feature = "config")]
use clap::Args;
use keyset_core::{Error, Result};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ListOptions, Listable};
use crate::filter::FilterSpec;

/// Page size used when the caller does not request one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size ever served.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Bounds applied to caller-requested page sizes.
///
/// A requested size of zero means "use the default"; anything above the
/// maximum is silently clamped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default)]
pub struct PageSizePolicy {
    /// Page size used when none is requested
    #[cfg_attr(
        feature = "config",
        arg(
            long = "list-default-page-size",
            env = "LIST_DEFAULT_PAGE_SIZE",
            default_value = "20"
        )
    )]
    pub default_page_size: u32,

    /// Upper bound on any page size
    #[cfg_attr(
        feature = "config",
        arg(
            long = "list-max-page-size",
            env = "LIST_MAX_PAGE_SIZE",
            default_value = "200"
        )
    )]
    pub max_page_size: u32,
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageSizePolicy {
    /// Creates a validated policy.
    pub fn new(default_page_size: u32, max_page_size: u32) -> Result<Self> {
        let this = Self {
            default_page_size,
            max_page_size,
        };
        this.validate()?;
        Ok(this)
    }

    /// Checks that both bounds are positive and the default fits under the
    /// maximum.
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(Error::invalid_input().with_message("max page size must be positive"));
        }

        if self.default_page_size == 0 {
            return Err(Error::invalid_input().with_message("default page size must be positive"));
        }

        if self.default_page_size > self.max_page_size {
            return Err(Error::invalid_input().with_message(format!(
                "default page size {} exceeds max page size {}",
                self.default_page_size, self.max_page_size
            )));
        }

        Ok(())
    }

    /// Normalizes a requested page size.
    ///
    /// Negative sizes are rejected, zero selects the default, and sizes above
    /// the maximum are clamped. The result is always in `1..=max_page_size`.
    pub fn normalize(&self, requested: i64) -> Result<u32> {
        if requested < 0 {
            return Err(Error::invalid_input().with_message(format!(
                "the page size should be greater than 0, got {requested}"
            )));
        }

        let max = self.max_page_size.max(1);
        let size = match requested {
            0 => self.default_page_size,
            n => u32::try_from(n).unwrap_or(u32::MAX),
        };

        Ok(size.clamp(1, max))
    }

    /// Builds options for a continuation request under this policy.
    ///
    /// See [`ListOptions::from_token`].
    pub fn options_from_token(&self, page_token: &str, page_size: i64) -> Result<ListOptions> {
        ListOptions::build_from_token(self, page_token, page_size)
    }

    /// Builds options for a continuation request over `L` under this policy.
    ///
    /// See [`ListOptions::from_token_for`].
    pub fn options_from_token_for<L: Listable>(
        &self,
        page_token: &str,
        page_size: i64,
    ) -> Result<ListOptions> {
        ListOptions::build_from_token_for::<L>(self, page_token, page_size)
    }

    /// Builds options for a first-page request under this policy.
    ///
    /// See [`ListOptions::from_criteria`].
    pub fn options_from_criteria<L: Listable>(
        &self,
        page_size: i64,
        sort_by: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<ListOptions> {
        ListOptions::build_from_criteria::<L>(self, page_size, sort_by, filter)
    }
}

/// Normalizes a requested page size under the default policy.
#[inline]
pub fn normalize_page_size(requested: i64) -> Result<u32> {
    PageSizePolicy::default().normalize(requested)
}

#[cfg(test)]
mod tests {
    use keyset_core::ErrorKind;

    use super::*;

    #[test]
    fn zero_selects_default() {
        assert_eq!(normalize_page_size(0).unwrap(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn oversized_is_clamped() {
        assert_eq!(normalize_page_size(500).unwrap(), MAX_PAGE_SIZE);
        assert_eq!(normalize_page_size(i64::MAX).unwrap(), MAX_PAGE_SIZE);
    }

    #[test]
    fn negative_is_rejected() {
        let err = normalize_page_size(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn in_range_is_unchanged() {
        assert_eq!(normalize_page_size(50).unwrap(), 50);
        assert_eq!(normalize_page_size(1).unwrap(), 1);
        assert_eq!(normalize_page_size(200).unwrap(), 200);
    }

    #[test]
    fn custom_policy() {
        let policy = PageSizePolicy::new(5, 10).unwrap();
        assert_eq!(policy.normalize(0).unwrap(), 5);
        assert_eq!(policy.normalize(11).unwrap(), 10);
    }

    #[test]
    fn invalid_policies() {
        assert!(PageSizePolicy::new(0, 10).is_err());
        assert!(PageSizePolicy::new(5, 0).is_err());
        assert!(PageSizePolicy::new(50, 10).is_err());
        assert!(PageSizePolicy::default().validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let policy: PageSizePolicy = serde_json::from_str(r#"{"max_page_size": 50}"#).unwrap();
        assert_eq!(policy.default_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(policy.max_page_size, 50);
    }
}
