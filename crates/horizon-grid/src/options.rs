//! Grid configuration read by the row model.
//!
//! [`GridOptions`] is the read-only configuration surface consulted by row
//! nodes and the selection logic. The serializable part lives in
//! [`SelectionSettings`] so it can be loaded from a settings file.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{GridOptions, RowSelection, SelectionSettings};
//!
//! let settings = SelectionSettings::from_toml_str(r#"
//!     row_selection = "multiple"
//!     group_selects_children = true
//! "#).unwrap();
//!
//! let options = GridOptions::<String>::new()
//!     .with_settings(settings)
//!     .row_id_getter(|row: &String| row.clone());
//!
//! assert!(options.is_row_selection_multi());
//! assert!(options.is_group_selects_children());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GridResult;

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSelection {
    /// Selecting a row deselects every other row.
    #[default]
    Single,
    /// Rows can be added to the selection and range-selected.
    Multiple,
}

/// Serializable selection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionSettings {
    /// Single or multiple row selection.
    pub row_selection: RowSelection,
    /// Whether a group's selection is derived from its children.
    pub group_selects_children: bool,
    /// Whether group selection only considers filtered children.
    pub group_selects_filtered: bool,
}

impl SelectionSettings {
    /// Parses settings from a TOML document.
    ///
    /// Missing keys take their defaults; unknown keys are rejected.
    pub fn from_toml_str(source: &str) -> GridResult<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Derives a row id from row data.
pub type RowIdGetter<D> = Arc<dyn Fn(&D) -> String + Send + Sync>;

/// Read-only configuration for a row tree.
pub struct GridOptions<D> {
    settings: SelectionSettings,
    row_id_getter: Option<RowIdGetter<D>>,
}

impl<D> GridOptions<D> {
    /// Creates options with default settings and no row id getter.
    pub fn new() -> Self {
        Self {
            settings: SelectionSettings::default(),
            row_id_getter: None,
        }
    }

    /// Replaces the selection settings.
    pub fn with_settings(mut self, settings: SelectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets single or multiple row selection.
    pub fn row_selection(mut self, row_selection: RowSelection) -> Self {
        self.settings.row_selection = row_selection;
        self
    }

    /// Enables or disables children-select-parent mode.
    pub fn group_selects_children(mut self, enabled: bool) -> Self {
        self.settings.group_selects_children = enabled;
        self
    }

    /// Makes group selection cascade into and aggregate over filtered children
    /// only. Has no effect unless groups select children.
    pub fn group_selects_filtered(mut self, enabled: bool) -> Self {
        self.settings.group_selects_filtered = enabled;
        self
    }

    /// Derives row ids from data instead of using caller-supplied ids.
    pub fn row_id_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&D) -> String + Send + Sync + 'static,
    {
        self.row_id_getter = Some(Arc::new(getter));
        self
    }

    /// The selection settings in effect.
    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    /// Returns `true` when more than one row may be selected.
    pub fn is_row_selection_multi(&self) -> bool {
        self.settings.row_selection == RowSelection::Multiple
    }

    /// Returns `true` when group selection is derived from children.
    pub fn is_group_selects_children(&self) -> bool {
        self.settings.group_selects_children
    }

    /// Returns `true` when group selection only considers filtered children.
    pub fn is_group_selects_filtered(&self) -> bool {
        self.settings.group_selects_filtered
    }

    /// The configured row id getter, if any.
    pub fn get_row_id_getter(&self) -> Option<&RowIdGetter<D>> {
        self.row_id_getter.as_ref()
    }
}

impl<D> Default for GridOptions<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for GridOptions<D> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            row_id_getter: self.row_id_getter.clone(),
        }
    }
}

impl<D> fmt::Debug for GridOptions<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridOptions")
            .field("settings", &self.settings)
            .field("row_id_getter", &self.row_id_getter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;

    #[test]
    fn test_settings_defaults() {
        let settings = SelectionSettings::from_toml_str("").unwrap();
        assert_eq!(settings, SelectionSettings::default());
        assert_eq!(settings.row_selection, RowSelection::Single);
    }

    #[test]
    fn test_settings_parse() {
        let settings = SelectionSettings::from_toml_str(
            r#"
            row_selection = "multiple"
            group_selects_children = true
            group_selects_filtered = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.row_selection, RowSelection::Multiple);
        assert!(settings.group_selects_children);
        assert!(settings.group_selects_filtered);
    }

    #[test]
    fn test_settings_reject_unknown_keys() {
        let err = SelectionSettings::from_toml_str("row_selektion = \"single\"").unwrap_err();
        assert!(matches!(err, GridError::Settings(_)));
    }

    #[test]
    fn test_options_builder() {
        let options = GridOptions::<u32>::new()
            .row_selection(RowSelection::Multiple)
            .group_selects_children(true)
            .row_id_getter(|n: &u32| format!("row-{n}"));

        assert!(options.is_row_selection_multi());
        assert!(options.is_group_selects_children());
        assert!(!options.is_group_selects_filtered());
        let getter = options.get_row_id_getter().unwrap();
        assert_eq!(getter(&7), "row-7");
    }
}
