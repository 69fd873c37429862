//! Sort keys shared by note listings and user settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which field a note list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Last modification time
    #[default]
    Edited,
    /// Creation time
    Created,
    /// Title, case-insensitive
    Title,
}

/// Direction of a note list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    /// Newest first for dates, Z to A for titles
    #[default]
    Descending,
}

impl SortBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edited => "edited",
            Self::Created => "created",
            Self::Title => "title",
        }
    }

    /// Human label used by sort pickers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edited => "Date Edited",
            Self::Created => "Date Created",
            Self::Title => "Title",
        }
    }
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edited" => Ok(Self::Edited),
            "created" => Ok(Self::Created),
            "title" => Ok(Self::Title),
            other => Err(Error::InvalidInput(format!("Unknown sort key: {other}"))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sort_keys() {
        assert_eq!("Title".parse::<SortBy>().unwrap(), SortBy::Title);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!("size".parse::<SortBy>().is_err());
    }

    #[test]
    fn reversed_flips_direction() {
        assert_eq!(SortOrder::Ascending.reversed(), SortOrder::Descending);
        assert_eq!(SortOrder::Descending.reversed(), SortOrder::Ascending);
    }
}
