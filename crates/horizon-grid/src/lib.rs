//! Row node tree and selection model for Horizon Grid.
//!
//! This crate holds the per-row state behind a data grid:
//!
//! - **Row Tree**: An arena of [`RowNode`]s with group, filter and sort
//!   child lists, footers and detail rows
//! - **Node State**: Notifying setters for layout, data and cell values
//! - **Selection**: Tri-state group selection, children-select-parent
//!   propagation and shift-click range selection
//! - **Events**: Lazily allocated per-node signals and a grid-wide
//!   [`EventService`]
//!
//! # Selection Example
//!
//! ```
//! use horizon_grid::{
//!     GridContext, GridEvent, GridEventKind, GridOptions, RowSelection, RowTree, SelectionState,
//! };
//!
//! let options = GridOptions::<&str>::new()
//!     .row_selection(RowSelection::Multiple)
//!     .group_selects_children(true);
//! let mut tree = RowTree::new(GridContext::new(options));
//!
//! tree.event_service()
//!     .add_event_listener(GridEventKind::SelectionChanged, |event| {
//!         assert_eq!(event, &GridEvent::SelectionChanged);
//!     });
//!
//! let fruit = tree.create_group("Fruit", None, "group-fruit");
//! tree.add_child(tree.root(), fruit).unwrap();
//! let apple = tree.create_node(Some("apple"), Some("1".into()));
//! let pear = tree.create_node(Some("pear"), Some("2".into()));
//! tree.add_child(fruit, apple).unwrap();
//! tree.add_child(fruit, pear).unwrap();
//!
//! tree.set_selected(apple, true);
//! assert_eq!(tree.is_selected(fruit), Some(SelectionState::Mixed));
//!
//! tree.set_selected(pear, true);
//! assert_eq!(tree.is_selected(fruit), Some(SelectionState::Selected));
//! assert_eq!(tree.selected_rows(), vec!["apple", "pear"]);
//! ```
//!
//! # Settings Example
//!
//! ```
//! use horizon_grid::{GridOptions, SelectionSettings};
//!
//! let settings = SelectionSettings::from_toml_str(
//!     r#"
//!     row_selection = "multiple"
//!     group_selects_children = true
//!     "#,
//! )
//! .unwrap();
//!
//! let options = GridOptions::<u32>::new().with_settings(settings);
//! assert!(options.is_row_selection_multi());
//! ```

mod context;
mod debug;
mod error;
mod event_service;
pub mod events;
mod node;
mod node_state;
mod options;
pub mod row_model;
pub mod selection;
mod tree;
mod value;
pub mod value_service;

pub use context::GridContext;
pub use debug::RowTreeDebug;
pub use error::{GridError, GridResult};
pub use event_service::{EventService, GridEvent, GridEventKind};
pub use events::{CellChangedEvent, DataChangedEvent, RowNodeSignals, RowSelectedEvent};
pub use node::{
    DaemonRow, FloatingPosition, NodeKey, RowNode, SelectionState, FOOTER_ID_PREFIX, ROOT_NODE_ID,
};
pub use options::{GridOptions, RowIdGetter, RowSelection, SelectionSettings};
pub use row_model::{ClientSideRowModel, RowModelType, RowModelView};
pub use selection::{SelectedEntry, SelectionController, SetSelectedParams};
pub use tree::{RowData, RowTree};
pub use value::{CellValue, ColumnId, ColumnValues};
pub use value_service::{ExtractorValueService, ValueService};

// Re-export the primitives users connect to
pub use horizon_grid_core::{ConnectionId, Signal, TreeFormatOptions, TreeStyle};
