//! Per-node (local) events.
//!
//! A node carries no listener storage until someone asks for it through
//! [`RowTree::node_signals`](crate::RowTree::node_signals). From then on
//! every state change on that node is also published on the matching signal
//! below; nodes nobody observes never allocate or emit.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{GridContext, GridOptions, RowTree};
//!
//! let mut tree = RowTree::new(GridContext::new(GridOptions::<String>::new()));
//! let row = tree.create_node(Some("a".to_string()), Some("1".into()));
//! tree.add_child(tree.root(), row).unwrap();
//!
//! tree.node_signals(row).unwrap().row_index_changed.connect(|index| {
//!     println!("row moved to {:?}", index);
//! });
//! tree.set_row_index(row, Some(4)).unwrap();
//! ```

use horizon_grid_core::{Signal, SignalEmitter};

use crate::node::{NodeKey, SelectionState};
use crate::value::{CellValue, ColumnId};

/// Payload of the local and grid-wide row-selected events.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSelectedEvent {
    /// The node whose selection changed.
    pub node: NodeKey,
    /// The node's row id.
    pub id: Option<String>,
    /// The new selection state.
    pub selected: SelectionState,
}

/// Payload of the data-changed event.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChangedEvent<D> {
    /// The node whose data was replaced.
    pub node: NodeKey,
    /// Data before the change.
    pub old_data: Option<D>,
    /// Data after the change.
    pub new_data: Option<D>,
    /// `true` when the new data describes the same entity and cells may be
    /// refreshed in place; `false` when the row should be rebuilt.
    pub is_bulk_update: bool,
}

/// Payload of the cell-changed event.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChangedEvent {
    /// The node that owns the cell.
    pub node: NodeKey,
    /// The cell's column.
    pub column: ColumnId,
    /// The value now shown in the cell.
    pub new_value: CellValue,
}

/// Signals for every local event a node can raise.
pub struct RowNodeSignals<D> {
    /// Emitted when the node's selection state changes.
    pub row_selected: Signal<RowSelectedEvent>,
    /// Emitted when the node's data is replaced.
    pub data_changed: Signal<DataChangedEvent<D>>,
    /// Emitted when a single cell of the node changes.
    pub cell_changed: Signal<CellChangedEvent>,
    /// Emitted with the new count of filtered descendants.
    pub all_children_count_changed: Signal<usize>,
    /// Emitted when the pointer enters the row.
    pub mouse_enter: Signal<()>,
    /// Emitted when the pointer leaves the row.
    pub mouse_leave: Signal<()>,
    /// Emitted with the new row height, on every height assignment.
    pub height_changed: Signal<Option<f64>>,
    /// Emitted with the new row top.
    pub top_changed: Signal<Option<f64>>,
    /// Emitted when the node becomes or stops being the first child.
    pub first_child_changed: Signal<bool>,
    /// Emitted when the node becomes or stops being the last child.
    pub last_child_changed: Signal<bool>,
    /// Emitted with the new child index.
    pub child_index_changed: Signal<usize>,
    /// Emitted with the new row index.
    pub row_index_changed: Signal<Option<usize>>,
    /// Emitted with the new expanded state.
    pub expanded_changed: Signal<bool>,
    /// Emitted with the new UI level.
    pub ui_level_changed: Signal<i32>,
}

impl<D: Send + 'static> Default for RowNodeSignals<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Send + 'static> RowNodeSignals<D> {
    /// Creates a block of unconnected signals.
    pub fn new() -> Self {
        Self {
            row_selected: Signal::new(),
            data_changed: Signal::new(),
            cell_changed: Signal::new(),
            all_children_count_changed: Signal::new(),
            mouse_enter: Signal::new(),
            mouse_leave: Signal::new(),
            height_changed: Signal::new(),
            top_changed: Signal::new(),
            first_child_changed: Signal::new(),
            last_child_changed: Signal::new(),
            child_index_changed: Signal::new(),
            row_index_changed: Signal::new(),
            expanded_changed: Signal::new(),
            ui_level_changed: Signal::new(),
        }
    }

    fn emitters(&self) -> [&dyn SignalEmitter; 14] {
        [
            &self.row_selected,
            &self.data_changed,
            &self.cell_changed,
            &self.all_children_count_changed,
            &self.mouse_enter,
            &self.mouse_leave,
            &self.height_changed,
            &self.top_changed,
            &self.first_child_changed,
            &self.last_child_changed,
            &self.child_index_changed,
            &self.row_index_changed,
            &self.expanded_changed,
            &self.ui_level_changed,
        ]
    }

    /// Total number of connected slots across all signals.
    pub fn connection_count(&self) -> usize {
        self.emitters().iter().map(|s| s.connection_count()).sum()
    }

    /// Disconnects every slot on every signal.
    pub fn disconnect_all(&self) {
        for signal in self.emitters() {
            signal.disconnect_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_count_spans_all_signals() {
        let signals = RowNodeSignals::<u8>::new();
        assert_eq!(signals.connection_count(), 0);

        signals.mouse_enter.connect(|_| {});
        signals.data_changed.connect(|_| {});
        signals.ui_level_changed.connect(|_| {});
        assert_eq!(signals.connection_count(), 3);

        signals.disconnect_all();
        assert_eq!(signals.connection_count(), 0);
    }
}
