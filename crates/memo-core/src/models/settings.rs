//! Application settings model

use serde::{Deserialize, Serialize};

use super::sort::{SortBy, SortOrder};
use super::theme::ThemeColor;

/// User preferences, handed explicitly to the library and browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Theme for notes created outside a folder
    pub default_theme: ThemeColor,
    /// Default list ordering key
    pub sort_by: SortBy,
    /// Default list ordering direction
    pub sort_order: SortOrder,
}
