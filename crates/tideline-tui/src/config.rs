//! Timeline tuning knobs
//!
//! Hosts load these alongside the rest of their TUI preferences; everything
//! has a default that behaves well for chat-sized content.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Tuning for windowing, anchoring and pagination
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Bottom gap (rows) at which auto-follow suspends; any gap below this
    /// still counts as "at bottom"
    pub follow_threshold_rows: usize,
    /// Top gap (rows) at which backward pagination triggers
    pub prefetch_threshold_rows: usize,
    /// Width delta (columns) beyond which cached heights are discarded
    pub width_tolerance_cols: u16,
    /// Items instantiated beyond each edge of the viewport
    pub overscan_items: usize,
    /// Height assumed for an item that has never been laid out
    pub estimated_item_rows: usize,
    /// Events requested per history page
    pub page_size: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            follow_threshold_rows: 4,
            prefetch_threshold_rows: 2,
            width_tolerance_cols: 2,
            overscan_items: 4,
            estimated_item_rows: 2,
            page_size: 50,
        }
    }
}

impl TimelineConfig {
    /// Parse from a TOML fragment, falling back to defaults for absent keys
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = TimelineConfig::default();
        assert!(config.follow_threshold_rows > 0);
        assert!(config.estimated_item_rows > 0);
        assert!(config.page_size > 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TimelineConfig::from_toml_str("page_size = 25\noverscan_items = 8\n").unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.overscan_items, 8);
        assert_eq!(
            config.follow_threshold_rows,
            TimelineConfig::default().follow_threshold_rows
        );
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = TimelineConfig::from_toml_str("page_size = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
