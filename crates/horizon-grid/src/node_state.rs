//! Notifying node setters.
//!
//! Every observable field of a [`RowNode`] is changed through one of the
//! methods here. Setters compare against the current value and do nothing
//! when it is unchanged; otherwise they store the value and emit the
//! matching local signal, if the node's signal block exists.

use std::collections::BTreeSet;

use horizon_grid_core::logging::targets;
use horizon_grid_core::Signal;

use crate::error::{GridError, GridResult};
use crate::event_service::GridEvent;
use crate::events::{CellChangedEvent, DataChangedEvent, RowNodeSignals};
use crate::node::{NodeKey, RowNode};
use crate::tree::{RowData, RowTree};
use crate::value::{CellValue, ColumnId, ColumnValues};

impl<D: RowData> RowTree<D> {
    /// Stores `value` in the field chosen by `field` and emits it on the
    /// signal chosen by `signal`. Returns whether the value changed.
    fn update_field<T, F, S>(&mut self, key: NodeKey, value: T, field: F, signal: S) -> GridResult<bool>
    where
        T: PartialEq + Clone + Send + 'static,
        F: FnOnce(&mut RowNode<D>) -> &mut T,
        S: FnOnce(&RowNodeSignals<D>) -> &Signal<T>,
    {
        let node = self.get_mut(key)?;
        let slot = field(node);
        if *slot == value {
            return Ok(false);
        }
        *slot = value.clone();
        if let Some(signals) = &node.signals {
            signal(signals).emit(value);
        }
        Ok(true)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Sets the vertical position, remembering the previous one.
    pub fn set_row_top(&mut self, key: NodeKey, row_top: Option<f64>) -> GridResult<()> {
        let node = self.get_mut(key)?;
        if node.row_top == row_top {
            return Ok(());
        }
        node.previous_row_top = node.row_top;
        node.row_top = row_top;
        if let Some(signals) = &node.signals {
            signals.top_changed.emit(row_top);
        }
        Ok(())
    }

    /// Sets the row height. Always notifies, even if the height is unchanged.
    pub fn set_row_height(&mut self, key: NodeKey, row_height: Option<f64>) -> GridResult<()> {
        let node = self.get_mut(key)?;
        node.row_height = row_height;
        if let Some(signals) = &node.signals {
            signals.height_changed.emit(row_height);
        }
        Ok(())
    }

    /// Sets the index among displayed rows.
    pub fn set_row_index(&mut self, key: NodeKey, row_index: Option<usize>) -> GridResult<()> {
        self.update_field(key, row_index, |n| &mut n.row_index, |s| &s.row_index_changed)
            .map(drop)
    }

    /// Sets whether the node is the first of its siblings.
    pub fn set_first_child(&mut self, key: NodeKey, first_child: bool) -> GridResult<()> {
        self.update_field(key, first_child, |n| &mut n.first_child, |s| &s.first_child_changed)
            .map(drop)
    }

    /// Sets whether the node is the last of its siblings.
    pub fn set_last_child(&mut self, key: NodeKey, last_child: bool) -> GridResult<()> {
        self.update_field(key, last_child, |n| &mut n.last_child, |s| &s.last_child_changed)
            .map(drop)
    }

    /// Sets the position among the parent's sorted children.
    pub fn set_child_index(&mut self, key: NodeKey, child_index: usize) -> GridResult<()> {
        self.update_field(key, child_index, |n| &mut n.child_index, |s| &s.child_index_changed)
            .map(drop)
    }

    /// Sets the number of filtered descendants.
    pub fn set_all_children_count(&mut self, key: NodeKey, count: usize) -> GridResult<()> {
        self.update_field(
            key,
            count,
            |n| &mut n.all_children_count,
            |s| &s.all_children_count_changed,
        )
        .map(drop)
    }

    /// Sets the indentation level.
    pub fn set_ui_level(&mut self, key: NodeKey, ui_level: i32) -> GridResult<()> {
        self.update_field(key, ui_level, |n| &mut n.ui_level, |s| &s.ui_level_changed)
            .map(drop)
    }

    /// Opens or closes the node.
    ///
    /// Besides the local event, a change publishes
    /// [`GridEvent::RowGroupOpened`] on the grid-wide service whether or not
    /// anyone listens to the node.
    pub fn set_expanded(&mut self, key: NodeKey, expanded: bool) -> GridResult<()> {
        if self.update_field(key, expanded, |n| &mut n.expanded, |s| &s.expanded_changed)? {
            tracing::debug!(target: targets::NODE, ?key, expanded, "row group toggled");
            self.context
                .event_service
                .dispatch_event(GridEvent::RowGroupOpened { node: key, expanded });
        }
        Ok(())
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replaces the data of a row that is being rebuilt.
    pub fn set_data(&mut self, key: NodeKey, data: Option<D>) -> GridResult<()> {
        self.replace_data(key, data, false)
    }

    /// Replaces the data of a row with a newer version of the same entity,
    /// so cells can refresh in place.
    pub fn update_data(&mut self, key: NodeKey, data: Option<D>) -> GridResult<()> {
        self.replace_data(key, data, true)
    }

    fn replace_data(&mut self, key: NodeKey, data: Option<D>, is_bulk_update: bool) -> GridResult<()> {
        let node = self.get_mut(key)?;
        let old_data = std::mem::replace(&mut node.data, data);
        Self::emit_data_changed(key, node, old_data, is_bulk_update);
        Ok(())
    }

    fn emit_data_changed(key: NodeKey, node: &RowNode<D>, old_data: Option<D>, is_bulk_update: bool) {
        if let Some(signals) = &node.signals {
            signals.data_changed.emit(DataChangedEvent {
                node: key,
                old_data,
                new_data: node.data.clone(),
                is_bulk_update,
            });
        }
    }

    /// Gives a live node a new identity.
    ///
    /// If the node already had an id, a [`DaemonRow`](crate::DaemonRow)
    /// snapshot of the old identity is handed to the selection controller
    /// so the old row's selection survives the swap. The live node takes
    /// the selection recorded for its new id, if any.
    pub fn set_data_and_id(&mut self, key: NodeKey, data: Option<D>, id: Option<String>) -> GridResult<()> {
        let daemon = self.get(key)?.create_daemon();
        let new_id = self.resolve_id(data.as_ref(), id);

        let node = self.nodes.get_mut(key).ok_or(GridError::InvalidNode(key))?;
        let old_data = std::mem::replace(&mut node.data, data);
        node.id = new_id;
        self.selection.sync_in_row_node(key, node, daemon);

        tracing::debug!(
            target: targets::NODE,
            ?key,
            id = node.id.as_deref(),
            "row identity replaced"
        );
        Self::emit_data_changed(key, node, old_data, false);
        Ok(())
    }

    /// Sets the row id.
    ///
    /// With a row id getter configured the id is derived from the data, and
    /// cleared when there is none; otherwise `id` is stored verbatim. A
    /// selected row stays selected under its new id, and leaves the
    /// selection when it loses its id.
    pub fn set_id(&mut self, key: NodeKey, id: Option<String>) -> GridResult<()> {
        let resolved = self.resolve_id(self.get(key)?.data.as_ref(), id);
        let node = self.nodes.get_mut(key).ok_or(GridError::InvalidNode(key))?;
        let old_id = std::mem::replace(&mut node.id, resolved);
        self.selection
            .rekey(key, old_id.as_deref(), node.id.as_deref());
        Ok(())
    }

    // =========================================================================
    // Cell values
    // =========================================================================

    /// Replaces the aggregated values.
    ///
    /// Each column present before or after the change raises one
    /// cell-changed event carrying the cell's raw data value.
    pub fn set_agg_data(&mut self, key: NodeKey, agg_data: Option<ColumnValues>) -> GridResult<()> {
        let node = self.get_mut(key)?;
        let mut columns: BTreeSet<ColumnId> = BTreeSet::new();
        for values in [node.agg_data.as_ref(), agg_data.as_ref()].into_iter().flatten() {
            columns.extend(values.keys().cloned());
        }
        node.agg_data = agg_data;

        let node = self.get(key)?;
        if let Some(signals) = &node.signals {
            for column in columns {
                let new_value = self.context.value_service.get_value(node, &column);
                signals.cell_changed.emit(CellChangedEvent {
                    node: key,
                    column,
                    new_value,
                });
            }
        }
        Ok(())
    }

    /// Writes a cell through the value service.
    ///
    /// Returns [`GridError::ValueRejected`] without notifying anyone if the
    /// service could not store the value.
    pub fn set_data_value(&mut self, key: NodeKey, column: &ColumnId, new_value: CellValue) -> GridResult<()> {
        let value_service = self.context.value_service.clone();
        let node = self.get_mut(key)?;
        if !value_service.set_value(node, column, new_value) {
            tracing::debug!(target: targets::NODE, ?key, %column, "value rejected");
            return Err(GridError::ValueRejected {
                column: column.clone(),
            });
        }
        if let Some(signals) = &node.signals {
            signals.cell_changed.emit(CellChangedEvent {
                node: key,
                column: column.clone(),
                new_value: value_service.get_value(node, column),
            });
        }
        Ok(())
    }

    /// Writes a group cell value.
    pub fn set_group_value(&mut self, key: NodeKey, column: &ColumnId, new_value: CellValue) -> GridResult<()> {
        let node = self.get_mut(key)?;
        node.group_data
            .get_or_insert_with(ColumnValues::new)
            .insert(column.clone(), new_value.clone());
        if let Some(signals) = &node.signals {
            signals.cell_changed.emit(CellChangedEvent {
                node: key,
                column: column.clone(),
                new_value,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Returns the node's signals, creating them on first use.
    pub fn node_signals(&mut self, key: NodeKey) -> GridResult<&RowNodeSignals<D>> {
        let node = self.get_mut(key)?;
        let signals = node.signals.get_or_insert_with(|| Box::new(RowNodeSignals::new()));
        Ok(&**signals)
    }

    /// Drops the node's signals and every connection on them.
    pub fn remove_node_listeners(&mut self, key: NodeKey) -> GridResult<()> {
        if let Some(signals) = self.get_mut(key)?.signals.take() {
            signals.disconnect_all();
        }
        Ok(())
    }

    /// Reports that the pointer entered the row.
    pub fn on_mouse_enter(&self, key: NodeKey) -> GridResult<()> {
        if let Some(signals) = &self.get(key)?.signals {
            signals.mouse_enter.emit(());
        }
        Ok(())
    }

    /// Reports that the pointer left the row.
    pub fn on_mouse_leave(&self, key: NodeKey) -> GridResult<()> {
        if let Some(signals) = &self.get(key)?.signals {
            signals.mouse_leave.emit(());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::context::GridContext;
    use crate::event_service::GridEventKind;
    use crate::options::GridOptions;
    use crate::value_service::ExtractorValueService;

    fn tree() -> RowTree<i64> {
        let values = ExtractorValueService::new(|n: &i64, _| CellValue::from(*n)).with_setter(
            |n: &mut i64, _, value| match value.as_int() {
                Some(v) => {
                    *n = v;
                    true
                }
                None => false,
            },
        );
        RowTree::new(GridContext::new(GridOptions::new()).with_value_service(values))
    }

    #[test]
    fn test_setters_skip_unchanged_values() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        tree.node_signals(node)
            .unwrap()
            .row_index_changed
            .connect(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            });

        tree.set_row_index(node, Some(2)).unwrap();
        tree.set_row_index(node, Some(2)).unwrap();
        tree.set_row_index(node, None).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(tree.node(node).unwrap().row_index(), None);
    }

    #[test]
    fn test_setters_without_listeners_still_store() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        tree.set_ui_level(node, 3).unwrap();
        tree.set_child_index(node, 7).unwrap();
        assert_eq!(tree.node(node).unwrap().ui_level(), 3);
        assert_eq!(tree.node(node).unwrap().child_index(), 7);
        assert!(!tree.node(node).unwrap().has_listeners());
    }

    #[test]
    fn test_row_height_always_notifies() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        let heights = Arc::new(Mutex::new(Vec::new()));
        let heights_clone = heights.clone();
        tree.node_signals(node)
            .unwrap()
            .height_changed
            .connect(move |h| heights_clone.lock().push(*h));

        tree.set_row_height(node, Some(25.0)).unwrap();
        tree.set_row_height(node, Some(25.0)).unwrap();
        assert_eq!(*heights.lock(), vec![Some(25.0), Some(25.0)]);
    }

    #[test]
    fn test_row_top_keeps_previous() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        tree.set_row_top(node, Some(10.0)).unwrap();
        tree.set_row_top(node, Some(40.0)).unwrap();
        let n = tree.node(node).unwrap();
        assert_eq!(n.row_top(), Some(40.0));
        assert_eq!(n.previous_row_top(), Some(10.0));
    }

    #[test]
    fn test_set_expanded_publishes_globally() {
        let mut tree = tree();
        let group = tree.create_group("g", None, "g");
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        tree.event_service()
            .add_event_listener(GridEventKind::RowGroupOpened, move |e| {
                events_clone.lock().push(e.clone())
            });

        tree.set_expanded(group, true).unwrap();
        tree.set_expanded(group, true).unwrap();
        assert_eq!(
            *events.lock(),
            vec![GridEvent::RowGroupOpened {
                node: group,
                expanded: true
            }]
        );
    }

    #[test]
    fn test_update_data_is_bulk() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        tree.node_signals(node)
            .unwrap()
            .data_changed
            .connect(move |e| seen_clone.lock().push(e.clone()));

        tree.set_data(node, Some(2)).unwrap();
        tree.update_data(node, Some(3)).unwrap();

        let seen = seen.lock();
        assert_eq!(seen[0].old_data, Some(1));
        assert_eq!(seen[0].new_data, Some(2));
        assert!(!seen[0].is_bulk_update);
        assert_eq!(seen[1].old_data, Some(2));
        assert!(seen[1].is_bulk_update);
    }

    #[test]
    fn test_set_agg_data_covers_removed_columns() {
        let mut tree = tree();
        let node = tree.create_node(Some(9), Some("1".into()));
        let first: ColumnValues = [(ColumnId::from("a"), CellValue::Int(1))].into_iter().collect();
        tree.set_agg_data(node, Some(first)).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        tree.node_signals(node)
            .unwrap()
            .cell_changed
            .connect(move |e| seen_clone.lock().push(e.clone()));

        let second: ColumnValues = [(ColumnId::from("b"), CellValue::Int(2))].into_iter().collect();
        tree.set_agg_data(node, Some(second)).unwrap();

        let seen = seen.lock();
        let columns: Vec<_> = seen.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "b"]);
        // Raw data value, not the aggregate.
        assert!(seen.iter().all(|e| e.new_value == CellValue::Int(9)));
    }

    #[test]
    fn test_set_data_value_through_service() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        tree.node_signals(node)
            .unwrap()
            .cell_changed
            .connect(move |e| seen_clone.lock().push(e.new_value.clone()));

        let column = ColumnId::from("value");
        tree.set_data_value(node, &column, CellValue::Int(5)).unwrap();
        assert_eq!(tree.node(node).unwrap().data(), Some(&5));

        let rejected = tree.set_data_value(node, &column, CellValue::from("five"));
        assert!(matches!(rejected, Err(GridError::ValueRejected { .. })));
        assert_eq!(*seen.lock(), vec![CellValue::Int(5)]);
    }

    #[test]
    fn test_set_group_value_creates_group_data() {
        let mut tree = tree();
        let group = tree.create_group("g", None, "g");
        assert!(tree.node(group).unwrap().group_data().is_none());

        let column = ColumnId::from("country");
        tree.set_group_value(group, &column, CellValue::from("Ireland"))
            .unwrap();
        assert_eq!(
            tree.node(group).unwrap().group_data().unwrap().get(&column),
            Some(&CellValue::from("Ireland"))
        );
    }

    #[test]
    fn test_mouse_events_and_listener_removal() {
        let mut tree = tree();
        let node = tree.create_node(Some(1), Some("1".into()));
        let count = Arc::new(AtomicUsize::new(0));
        let enter = count.clone();
        let leave = count.clone();
        let signals = tree.node_signals(node).unwrap();
        signals.mouse_enter.connect(move |_| {
            enter.fetch_add(1, Ordering::SeqCst);
        });
        signals.mouse_leave.connect(move |_| {
            leave.fetch_add(10, Ordering::SeqCst);
        });

        tree.on_mouse_enter(node).unwrap();
        tree.on_mouse_leave(node).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 11);

        tree.remove_node_listeners(node).unwrap();
        assert!(!tree.node(node).unwrap().has_listeners());
        tree.on_mouse_enter(node).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_set_id_with_getter() {
        let options = GridOptions::new().row_id_getter(|n: &i64| format!("n{n}"));
        let mut tree = RowTree::new(GridContext::new(options));
        let node = tree.create_node(Some(3), None);
        tree.set_id(node, Some("manual".into())).unwrap();
        assert_eq!(tree.node(node).unwrap().id(), Some("n3"));

        tree.set_data(node, None).unwrap();
        tree.set_id(node, Some("manual".into())).unwrap();
        assert_eq!(tree.node(node).unwrap().id(), None);
    }

    #[test]
    fn test_set_id_moves_selection_record() {
        let mut tree = tree();
        let root = tree.root();
        let node = tree.create_node(Some(1), Some("old".into()));
        tree.add_child(root, node).unwrap();
        tree.set_selected(node, true);

        tree.set_id(node, Some("new".into())).unwrap();
        assert!(!tree.selection().is_id_selected("old"));
        assert!(tree.selection().is_id_selected("new"));
        assert_eq!(tree.selection().selected_count(), 1);

        tree.set_id(node, None).unwrap();
        assert!(tree.selection().is_empty());
    }
}
