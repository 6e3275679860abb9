//! Sort order direction.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Sort order direction.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    /// Ascending order (A-Z, oldest first, smallest first).
    #[default]
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    Desc,
}

impl SortOrder {
    /// Returns the order matching a descending flag.
    #[inline]
    pub fn from_desc(is_desc: bool) -> Self {
        if is_desc { Self::Desc } else { Self::Asc }
    }

    /// Returns whether the sort order is descending.
    #[inline]
    pub fn is_desc(self) -> bool {
        matches!(self, Self::Desc)
    }

    /// Returns the SQL keyword for this direction.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
