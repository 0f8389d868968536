//! Logging and debugging facilities for Horizon Grid.
//!
//! This module provides:
//! - Target and span names for the `tracing` integration
//! - Formatting options shared by the tree debug renderers
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_grid::selection=debug")
//!         .init();
//! }
//! ```

/// Span names used throughout Horizon Grid for tracing.
pub mod span_names {
    /// Selection propagation span.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Range selection span.
    pub const RANGE_SELECTION: &str = "horizon_grid::range_selection";
    /// Tree-wide group recompute span.
    pub const GROUP_RECOMPUTE: &str = "horizon_grid::group_recompute";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "horizon_grid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Row node state target.
    pub const NODE: &str = "horizon_grid::node";
    /// Selection propagation target.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Grid event service target.
    pub const EVENTS: &str = "horizon_grid::events";
    /// Performance spans target.
    pub const PERF: &str = "horizon_grid::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node keys.
    pub show_ids: bool,
    /// Whether to show node kind (group, footer, leaf).
    pub show_types: bool,
    /// Whether to show per-node state such as selection and expansion.
    pub show_properties: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_properties: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_properties: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_properties: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a tree line at `depth`.
    pub fn line_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }

    /// Build the prefix for detail lines printed under a tree line.
    pub fn detail_prefix(&self, depth: usize) -> String {
        let branch = match self.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };

        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of tree-wide operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_prefix() {
        let options = TreeFormatOptions::default();
        assert_eq!(options.line_prefix(0, true), "");
    }

    #[test]
    fn test_ascii_prefixes() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.line_prefix(1, false), "+-- ");
        assert_eq!(options.line_prefix(1, true), "`-- ");
        assert_eq!(options.line_prefix(2, true), "|  `-- ");
        assert_eq!(options.detail_prefix(1), "|  ");
    }

    #[test]
    fn test_minimal_options() {
        let options = TreeFormatOptions::minimal();
        assert!(!options.show_ids);
        assert!(!options.show_types);
        assert!(TreeFormatOptions::detailed().show_properties);
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
