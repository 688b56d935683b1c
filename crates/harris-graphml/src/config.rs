//! Export configuration
//!
//! An explicit, immutable configuration is passed into the serializer; there
//! are no process-wide defaults. [`HarrisConfig`] is the TOML file shape:
//!
//! ```toml
//! large_graph_threshold = 500
//!
//! [export]
//! use_extended_labels = true
//! include_periods = true
//! reverse_epochs = false
//! grouping_mode = "period"
//!
//! [style]
//! node_width = 90.0
//! table_title = "Harris Matrix"
//! ```

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What the swimlane table groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Period rows, area columns
    PeriodArea,
    /// Period rows only
    #[default]
    Period,
    /// Area rows only
    Area,
    /// No table
    None,
}

impl GroupingMode {
    /// Every mode
    pub const ALL: [GroupingMode; 4] = [Self::PeriodArea, Self::Period, Self::Area, Self::None];

    /// Rows are period buckets
    #[inline]
    #[must_use]
    pub fn groups_by_period(self) -> bool {
        matches!(self, Self::PeriodArea | Self::Period)
    }

    /// Areas are rows or columns
    #[inline]
    #[must_use]
    pub fn groups_by_area(self) -> bool {
        matches!(self, Self::PeriodArea | Self::Area)
    }

    /// Configuration name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PeriodArea => "period_area",
            Self::Period => "period",
            Self::Area => "area",
            Self::None => "none",
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| format!("unknown grouping mode '{s}' (period_area, period, area, none)"))
    }
}

/// Options accepted by the export entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Label nodes with kind, number, short definition and period-phase
    pub use_extended_labels: bool,
    /// Wrap nodes in a swimlane table
    pub include_periods: bool,
    /// Latest rows first
    pub reverse_epochs: bool,
    /// What the table groups by
    pub grouping_mode: GroupingMode,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            use_extended_labels: false,
            include_periods: true,
            reverse_epochs: false,
            grouping_mode: GroupingMode::Period,
        }
    }
}

impl ExportOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With extended labels
    #[inline]
    #[must_use]
    pub fn with_extended_labels(mut self, enabled: bool) -> Self {
        self.use_extended_labels = enabled;
        self
    }

    /// With or without the swimlane table
    #[inline]
    #[must_use]
    pub fn with_periods(mut self, enabled: bool) -> Self {
        self.include_periods = enabled;
        self
    }

    /// With reversed row order
    #[inline]
    #[must_use]
    pub fn with_reverse_epochs(mut self, enabled: bool) -> Self {
        self.reverse_epochs = enabled;
        self
    }

    /// With grouping mode
    #[inline]
    #[must_use]
    pub fn with_grouping(mut self, mode: GroupingMode) -> Self {
        self.grouping_mode = mode;
        self
    }

    /// True when a swimlane table is emitted
    #[inline]
    #[must_use]
    pub fn uses_table(&self) -> bool {
        self.include_periods && self.grouping_mode != GroupingMode::None
    }
}

/// Geometry and typography of the drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    /// Node width
    pub node_width: f64,
    /// Node height
    pub node_height: f64,
    /// Gap between nodes in one layer
    pub horizontal_spacing: f64,
    /// Gap between layers
    pub vertical_spacing: f64,
    /// Width of the row header band
    pub row_header_width: f64,
    /// Height of the column header band
    pub column_header_height: f64,
    /// Height of the table title band
    pub title_height: f64,
    /// Node label font size
    pub font_size: u32,
    /// Row and column label font size
    pub header_font_size: u32,
    /// Table title
    pub table_title: String,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            node_width: 90.0,
            node_height: 30.0,
            horizontal_spacing: 30.0,
            vertical_spacing: 40.0,
            row_header_width: 30.0,
            column_header_height: 24.0,
            title_height: 30.0,
            font_size: 12,
            header_font_size: 14,
            table_title: "Harris Matrix".to_string(),
        }
    }
}

impl LayoutStyle {
    /// With a table title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.table_title = title.into();
        self
    }

    /// With node size
    #[inline]
    #[must_use]
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }
}

/// Whole configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarrisConfig {
    /// Export options
    pub export: ExportOptions,
    /// Drawing style
    pub style: LayoutStyle,
    /// Sites with more units skip in-process rendering
    pub large_graph_threshold: usize,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        Self {
            export: ExportOptions::default(),
            style: LayoutStyle::default(),
            large_graph_threshold: 500,
        }
    }
}

impl HarrisConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With export options
    #[inline]
    #[must_use]
    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    /// With style
    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    /// With large-graph threshold
    #[inline]
    #[must_use]
    pub fn with_large_graph_threshold(mut self, threshold: usize) -> Self {
        self.large_graph_threshold = threshold;
        self
    }

    /// True when a site of `units` units is over the threshold
    #[inline]
    #[must_use]
    pub fn is_large(&self, units: usize) -> bool {
        units > self.large_graph_threshold
    }

    /// Parse TOML text; missing keys take defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ExportError> {
        toml::from_str(text).map_err(|e| ExportError::Config {
            path: Default::default(),
            message: e.to_string(),
        })
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ExportError::io_error(path, e))?;
        toml::from_str(&text).map_err(|e| ExportError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = HarrisConfig::from_toml_str(
            r#"
            large_graph_threshold = 50

            [export]
            grouping_mode = "area"
            reverse_epochs = true
            "#,
        )
        .unwrap();
        assert_eq!(config.large_graph_threshold, 50);
        assert_eq!(config.export.grouping_mode, GroupingMode::Area);
        assert!(config.export.reverse_epochs);
        assert!(config.export.include_periods);
        assert_eq!(config.style, LayoutStyle::default());
    }

    #[test]
    fn unknown_grouping_mode_is_a_config_error() {
        let err = HarrisConfig::from_toml_str("[export]\ngrouping_mode = \"site\"").unwrap_err();
        assert!(matches!(err, ExportError::Config { .. }));
    }

    #[test]
    fn grouping_mode_parses_cli_spelling() {
        assert_eq!("period-area".parse::<GroupingMode>(), Ok(GroupingMode::PeriodArea));
        assert_eq!("NONE".parse::<GroupingMode>(), Ok(GroupingMode::None));
        assert!("rows".parse::<GroupingMode>().is_err());
    }

    #[test]
    fn table_needs_periods_and_a_mode() {
        assert!(ExportOptions::new().uses_table());
        assert!(!ExportOptions::new().with_periods(false).uses_table());
        assert!(!ExportOptions::new().with_grouping(GroupingMode::None).uses_table());
    }

    #[test]
    fn large_graph_threshold_is_exclusive() {
        let config = HarrisConfig::new().with_large_graph_threshold(10);
        assert!(!config.is_large(10));
        assert!(config.is_large(11));
    }
}
