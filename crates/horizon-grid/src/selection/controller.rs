//! Bookkeeping of which rows are selected.

use std::collections::BTreeMap;

use horizon_grid_core::logging::targets;

use crate::node::{DaemonRow, NodeKey, RowNode, SelectionState};

/// A selected row as recorded by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedEntry<D> {
    /// A node that is part of the tree.
    Live(NodeKey),
    /// A snapshot of a row whose node was reused for another row.
    Daemon(DaemonRow<D>),
}

/// The selection registry of one tree.
///
/// Tracks selected rows by id and the anchor used for range selection.
/// Entries are kept in id order.
pub struct SelectionController<D> {
    selected: BTreeMap<String, SelectedEntry<D>>,
    last_selected: Option<NodeKey>,
}

impl<D> Default for SelectionController<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> SelectionController<D> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            selected: BTreeMap::new(),
            last_selected: None,
        }
    }

    /// The anchor of the next range selection.
    pub fn last_selected_node(&self) -> Option<NodeKey> {
        self.last_selected
    }

    pub(crate) fn set_last_selected_node(&mut self, key: Option<NodeKey>) {
        self.last_selected = key;
    }

    /// Number of selected rows, daemon rows included.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether the row with `id` is recorded as selected.
    pub fn is_id_selected(&self, id: &str) -> bool {
        self.selected.contains_key(id)
    }

    /// The daemon kept for `id`, if the row under that id was swapped out
    /// while selected.
    pub fn daemon(&self, id: &str) -> Option<&DaemonRow<D>> {
        match self.selected.get(id) {
            Some(SelectedEntry::Daemon(daemon)) => Some(daemon),
            _ => None,
        }
    }

    /// All recorded entries, in id order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SelectedEntry<D>)> {
        self.selected.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Selected nodes that are part of the tree, in id order.
    pub fn live_nodes(&self) -> Vec<NodeKey> {
        self.selected
            .values()
            .filter_map(|entry| match entry {
                SelectedEntry::Live(key) => Some(*key),
                SelectedEntry::Daemon(_) => None,
            })
            .collect()
    }

    pub(crate) fn daemon_ids(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter(|(_, entry)| matches!(entry, SelectedEntry::Daemon(_)))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Records a node's new selection state.
    ///
    /// Only fully selected nodes are kept; mixed groups count as not
    /// selected.
    pub(crate) fn on_row_selected(&mut self, key: NodeKey, id: &str, selected: SelectionState) {
        if selected.is_selected() {
            self.selected.insert(id.to_string(), SelectedEntry::Live(key));
        } else {
            self.selected.remove(id);
        }
    }

    /// Moves the record held by `key` from `old_id` to `new_id`.
    ///
    /// A node losing its id drops out of the selection.
    pub(crate) fn rekey(&mut self, key: NodeKey, old_id: Option<&str>, new_id: Option<&str>) {
        let Some(old_id) = old_id else {
            return;
        };
        if new_id == Some(old_id)
            || !matches!(self.selected.get(old_id), Some(SelectedEntry::Live(live)) if *live == key)
        {
            return;
        }
        self.selected.remove(old_id);
        if let Some(new_id) = new_id {
            self.selected.insert(new_id.to_string(), SelectedEntry::Live(key));
        }
    }

    pub(crate) fn remove_daemon(&mut self, id: &str) -> bool {
        if matches!(self.selected.get(id), Some(SelectedEntry::Daemon(_))) {
            self.selected.remove(id);
            true
        } else {
            false
        }
    }

    /// Reconciles the registry after `node` took a new identity.
    ///
    /// If the old identity was recorded against this node, the record moves
    /// to `daemon`. The node's own selection is then set from whatever is
    /// recorded for its new id, without notifying anyone.
    pub(crate) fn sync_in_row_node(
        &mut self,
        key: NodeKey,
        node: &mut RowNode<D>,
        daemon: Option<DaemonRow<D>>,
    ) {
        if let Some(daemon) = daemon {
            let id_changed = node.id.as_deref() != Some(daemon.id.as_str());
            let held_by_node = matches!(
                self.selected.get(&daemon.id),
                Some(SelectedEntry::Live(live)) if *live == key
            );
            if id_changed && held_by_node {
                tracing::debug!(target: targets::SELECTION, id = %daemon.id, "selection kept by daemon row");
                self.selected
                    .insert(daemon.id.clone(), SelectedEntry::Daemon(daemon));
            }
        }

        let recorded = node
            .id
            .as_deref()
            .is_some_and(|id| self.selected.contains_key(id));
        if let (true, Some(id)) = (recorded, node.id.clone()) {
            node.set_selected_initial_value(SelectionState::Selected);
            self.selected.insert(id, SelectedEntry::Live(key));
        } else {
            node.set_selected_initial_value(SelectionState::Deselected);
        }
    }

    /// Drops every record of a removed node.
    pub(crate) fn forget(&mut self, key: NodeKey) {
        self.selected
            .retain(|_, entry| !matches!(entry, SelectedEntry::Live(live) if *live == key));
        if self.last_selected == Some(key) {
            self.last_selected = None;
        }
    }

    /// Forgets every selection and the anchor, without touching nodes.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.last_selected = None;
    }
}
