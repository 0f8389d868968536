//! Selection propagation.
//!
//! [`RowTree::set_selected_params`] is the single entry point for a user
//! selection action. It assigns the target node, cascades the value into a
//! group's children when groups select children, clears other rows when the
//! action replaces the selection, recomputes the tri-state of affected
//! groups, and finally publishes one [`GridEvent::SelectionChanged`].
//!
//! ```
//! use horizon_grid::{GridContext, GridOptions, RowSelection, RowTree, SelectionState};
//!
//! let options = GridOptions::<u32>::new()
//!     .row_selection(RowSelection::Multiple)
//!     .group_selects_children(true);
//! let mut tree = RowTree::new(GridContext::new(options));
//! let group = tree.create_group("g", None, "g");
//! tree.add_child(tree.root(), group).unwrap();
//! let a = tree.create_node(Some(1), Some("a".into()));
//! let b = tree.create_node(Some(2), Some("b".into()));
//! tree.add_child(group, a).unwrap();
//! tree.add_child(group, b).unwrap();
//!
//! tree.set_selected(a, true);
//! assert_eq!(tree.is_selected(group), Some(SelectionState::Mixed));
//!
//! tree.set_selected(group, true);
//! assert_eq!(tree.is_selected(b), Some(SelectionState::Selected));
//! ```

mod controller;
mod range;

pub use controller::{SelectedEntry, SelectionController};

use horizon_grid_core::logging::{span_names, targets};
use horizon_grid_core::PerfSpan;

use crate::event_service::GridEvent;
use crate::events::RowSelectedEvent;
use crate::node::{NodeKey, SelectionState};
use crate::row_model::RowModelType;
use crate::tree::{RowData, RowTree};

/// Parameters of a selection action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetSelectedParams {
    /// The value to select the node to.
    pub new_value: bool,
    /// Deselect every other row first.
    pub clear_selection: bool,
    /// Select the range between the anchor and this node instead.
    pub range_select: bool,
    /// Cascade into and aggregate over filtered children only.
    pub group_selects_filtered: bool,
}

impl SetSelectedParams {
    /// Parameters selecting (or deselecting) a single node.
    pub fn new(new_value: bool) -> Self {
        Self {
            new_value,
            ..Default::default()
        }
    }

    /// Sets whether other rows are cleared first.
    pub fn clear_selection(mut self, clear_selection: bool) -> Self {
        self.clear_selection = clear_selection;
        self
    }

    /// Sets whether this is a range (shift-click) action.
    pub fn range_select(mut self, range_select: bool) -> Self {
        self.range_select = range_select;
        self
    }

    /// Sets whether only filtered children are considered.
    pub fn group_selects_filtered(mut self, group_selects_filtered: bool) -> Self {
        self.group_selects_filtered = group_selects_filtered;
        self
    }
}

impl<D: RowData> RowTree<D> {
    /// Selects or deselects a node, keeping other selections.
    ///
    /// Whether groups consider filtered children only is taken from the
    /// options. Returns the number of nodes whose state changed.
    pub fn set_selected(&mut self, key: NodeKey, new_value: bool) -> usize {
        self.set_selected_with(key, new_value, false)
    }

    /// Selects or deselects a node, optionally clearing other selections.
    pub fn set_selected_with(&mut self, key: NodeKey, new_value: bool, clear_selection: bool) -> usize {
        let group_selects_filtered = self.context.options.is_group_selects_filtered();
        self.set_selected_params(
            key,
            SetSelectedParams::new(new_value)
                .clear_selection(clear_selection)
                .group_selects_filtered(group_selects_filtered),
        )
    }

    /// Runs one selection action and returns the number of nodes whose
    /// state changed.
    ///
    /// Nodes without an id and floating rows are rejected with a warning
    /// and a count of 0. Footers act on their group.
    pub fn set_selected_params(&mut self, key: NodeKey, params: SetSelectedParams) -> usize {
        let _span = PerfSpan::new(span_names::SELECTION);
        let Some(target) = self.resolve_selection_target(key) else {
            return 0;
        };

        let options = &self.context.options;
        let multi = options.is_row_selection_multi();
        let group_selects_children = options.is_group_selects_children();

        if params.range_select
            && self.context.row_model.model_type() == RowModelType::ClientSide
            && multi
            && self.selection.last_selected_node() != Some(target)
        {
            return self.select_range(target);
        }

        let mut updated = self.apply_to_subtree(target, params);

        if params.new_value && (params.clear_selection || !multi) {
            updated += self.clear_other_nodes(target);
        }

        if updated > 0 {
            // Group states are only derived when groups select children.
            if group_selects_children {
                if params.group_selects_filtered {
                    self.calculate_selected_for_all_group_nodes();
                } else if let Some(parent) = self.nodes[target].parent {
                    self.calculate_selected_from_children_bubble_up(parent);
                }
            }
            tracing::debug!(
                target: targets::SELECTION,
                ?target,
                new_value = params.new_value,
                updated,
                "selection changed"
            );
            self.context
                .event_service
                .dispatch_event(GridEvent::SelectionChanged);
        }

        if params.new_value {
            self.selection.set_last_selected_node(Some(target));
        }
        updated
    }

    /// Maps `key` to the node a selection action applies to, or `None` if
    /// the node cannot be selected.
    fn resolve_selection_target(&self, key: NodeKey) -> Option<NodeKey> {
        let Some(node) = self.nodes.get(key) else {
            tracing::warn!(target: targets::SELECTION, ?key, "cannot select a removed row node");
            return None;
        };
        if node.id.is_none() {
            tracing::warn!(
                target: targets::SELECTION,
                ?key,
                "cannot select a row node that has no id yet"
            );
            return None;
        }
        if node.is_floating() {
            tracing::warn!(target: targets::SELECTION, ?key, "floating rows cannot be selected");
            return None;
        }
        if node.footer {
            return node
                .sibling
                .and_then(|group| self.resolve_selection_target(group));
        }
        Some(key)
    }

    /// Assigns `params.new_value` to `key` and, when groups select
    /// children, to everything below it. Clears nothing, recomputes nothing
    /// and publishes only per-node events.
    fn apply_to_subtree(&mut self, key: NodeKey, params: SetSelectedParams) -> usize {
        let group_selects_children = self.context.options.is_group_selects_children();
        let is_group = self.nodes[key].group;
        let mut updated = 0;

        // Groups aggregating filtered children take their value from them.
        let skip_self = group_selects_children && params.group_selects_filtered && is_group;
        if !skip_self && self.select_this_node(key, params.new_value.into()) {
            updated += 1;
        }

        if group_selects_children && is_group {
            let node = &self.nodes[key];
            let children = if params.group_selects_filtered {
                node.children_after_filter.clone()
            } else {
                node.children_after_group.clone()
            };
            for child in children {
                if let Some(child) = self.resolve_selection_target(child) {
                    updated += self.apply_to_subtree(child, params);
                }
            }
        }
        updated
    }

    /// Sets one node's state and publishes it, locally and grid-wide.
    ///
    /// Returns `false` if the state was already `selected`.
    pub(crate) fn select_this_node(&mut self, key: NodeKey, selected: SelectionState) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        if node.selected == selected {
            return false;
        }
        node.selected = selected;
        if let Some(id) = &node.id {
            self.selection.on_row_selected(key, id, selected);
        }

        let event = RowSelectedEvent {
            node: key,
            id: node.id.clone(),
            selected,
        };
        if let Some(signals) = &node.signals {
            signals.row_selected.emit(event.clone());
        }
        self.context
            .event_service
            .dispatch_event(GridEvent::RowSelected(event));
        true
    }

    /// Derives a group's state from its children and applies it.
    ///
    /// Selected if every child is selected, deselected if none is, mixed
    /// otherwise. A group without children is mixed.
    pub fn calculate_selected_from_children(&mut self, key: NodeKey) -> bool {
        let Some(node) = self.nodes.get(key) else {
            return false;
        };

        let mut any_selected = false;
        let mut any_deselected = false;
        let mut any_mixed = false;
        for &child in &node.children_after_group {
            match self.is_selected(child) {
                Some(SelectionState::Selected) => any_selected = true,
                Some(SelectionState::Deselected) => any_deselected = true,
                Some(SelectionState::Mixed) => any_mixed = true,
                None => {}
            }
        }

        let state = if any_mixed {
            SelectionState::Mixed
        } else {
            match (any_selected, any_deselected) {
                (true, false) => SelectionState::Selected,
                (false, true) => SelectionState::Deselected,
                _ => SelectionState::Mixed,
            }
        };
        self.select_this_node(key, state)
    }

    /// Recomputes `key` and each of its ancestors below the root.
    pub fn calculate_selected_from_children_bubble_up(&mut self, key: NodeKey) {
        let mut current = Some(key);
        while let Some(node_key) = current {
            if node_key == self.root {
                break;
            }
            self.calculate_selected_from_children(node_key);
            current = self.nodes.get(node_key).and_then(|n| n.parent);
        }
    }

    /// Recomputes every group, children before parents.
    pub(crate) fn calculate_selected_for_all_group_nodes(&mut self) -> usize {
        let _span = PerfSpan::new(span_names::GROUP_RECOMPUTE);
        let row_model = self.context.row_model.clone();
        let mut updated = 0;
        for top_level in row_model.top_level_nodes(self) {
            for key in self.post_order(top_level) {
                let is_group = self.nodes.get(key).is_some_and(|n| n.group);
                if is_group && self.calculate_selected_from_children(key) {
                    updated += 1;
                }
            }
        }
        updated
    }

    /// Deselects every selected row except `keep`.
    ///
    /// Daemon rows are dropped from the registry, counting one each. When
    /// groups select children, the ancestors and descendants of `keep` are
    /// left alone and the groups above each cleared row are recomputed.
    fn clear_other_nodes(&mut self, keep: NodeKey) -> usize {
        let group_selects_children = self.context.options.is_group_selects_children();
        let mut updated = 0;

        for id in self.selection.daemon_ids() {
            if self.selection.remove_daemon(&id) {
                updated += 1;
            }
        }

        let mut groups_to_refresh = Vec::new();
        for other in self.selection.live_nodes() {
            if other == keep || !self.nodes.contains_key(other) {
                continue;
            }
            if group_selects_children
                && (self.is_ancestor_of(keep, other) || self.is_ancestor_of(other, keep))
            {
                continue;
            }
            updated += self.apply_to_subtree(other, SetSelectedParams::new(false));
            if group_selects_children {
                if let Some(parent) = self.nodes[other].parent {
                    if !groups_to_refresh.contains(&parent) {
                        groups_to_refresh.push(parent);
                    }
                }
            }
        }

        for group in groups_to_refresh {
            self.calculate_selected_from_children_bubble_up(group);
        }
        updated
    }

    /// Moves the range-selection anchor.
    pub fn set_last_selected_node(&mut self, key: Option<NodeKey>) {
        self.selection.set_last_selected_node(key);
    }

    /// Forgets every recorded selection, daemon rows and the anchor.
    ///
    /// Nodes keep their state; this is for when the row model is about to
    /// rebuild the tree from new data.
    pub fn reset_selection(&mut self) {
        tracing::debug!(target: targets::SELECTION, "selection registry reset");
        self.selection.reset();
    }

    /// Recomputes every group from its children.
    ///
    /// Does nothing unless groups select children and rows are held client
    /// side. Returns the number of groups whose state changed.
    pub fn update_groups_from_children_selections(&mut self) -> usize {
        if !self.context.options.is_group_selects_children() {
            return 0;
        }
        if self.context.row_model.model_type() != RowModelType::ClientSide {
            tracing::warn!(
                target: targets::SELECTION,
                "group selection can only be recomputed for client-side rows"
            );
            return 0;
        }
        let mut updated = 0;
        for key in self.post_order(self.root) {
            if key != self.root && self.nodes[key].group && self.calculate_selected_from_children(key) {
                updated += 1;
            }
        }
        updated
    }

    /// Selects every row, or every row passing the filter.
    pub fn select_all(&mut self, filtered: bool) -> usize {
        self.set_all(true, filtered)
    }

    /// Deselects every row, or every row passing the filter.
    ///
    /// Deselecting everything also forgets daemon rows and the anchor.
    pub fn deselect_all(&mut self, filtered: bool) -> usize {
        let updated = self.set_all(false, filtered);
        if !filtered {
            self.selection.reset();
        }
        updated
    }

    fn set_all(&mut self, selected: bool, filtered: bool) -> usize {
        let row_model = self.context.row_model.clone();
        let mut keys = Vec::new();
        if filtered {
            row_model.for_each_node_after_filter(self, &mut |key| keys.push(key));
        } else {
            row_model.for_each_node(self, &mut |key| keys.push(key));
        }

        let mut updated = 0;
        for key in keys {
            let has_id = self.nodes.get(key).is_some_and(|n| n.id.is_some());
            if has_id && self.select_this_node(key, selected.into()) {
                updated += 1;
            }
        }

        if row_model.model_type() == RowModelType::ClientSide {
            updated += self.update_groups_from_children_selections();
        }
        tracing::debug!(target: targets::SELECTION, selected, filtered, updated, "bulk selection");
        self.context
            .event_service
            .dispatch_event(GridEvent::SelectionChanged);
        updated
    }

    /// Selected nodes that are part of the tree.
    pub fn selected_nodes(&self) -> Vec<NodeKey> {
        self.selection.live_nodes()
    }

    /// Data of every selected row, daemon rows included.
    pub fn selected_rows(&self) -> Vec<D> {
        self.selection
            .entries()
            .filter_map(|(_, entry)| match entry {
                SelectedEntry::Live(key) => self.nodes.get(*key).and_then(|n| n.data.clone()),
                SelectedEntry::Daemon(daemon) => daemon.data.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::context::GridContext;
    use crate::event_service::GridEventKind;
    use crate::node::FloatingPosition;
    use crate::options::{GridOptions, RowSelection};

    struct Fixture {
        tree: RowTree<u32>,
        group: NodeKey,
        leaves: Vec<NodeKey>,
    }

    fn fixture(options: GridOptions<u32>, leaf_count: u32) -> Fixture {
        let mut tree = RowTree::new(GridContext::new(options));
        let root = tree.root();
        let group = tree.create_group("g", None, "g");
        tree.add_child(root, group).unwrap();
        let leaves = (0..leaf_count)
            .map(|n| {
                let key = tree.create_node(Some(n), Some(format!("n{n}")));
                tree.add_child(group, key).unwrap();
                key
            })
            .collect();
        Fixture { tree, group, leaves }
    }

    fn multi_gsc() -> GridOptions<u32> {
        GridOptions::new()
            .row_selection(RowSelection::Multiple)
            .group_selects_children(true)
    }

    #[test]
    fn test_select_is_idempotent() {
        let Fixture {
            mut tree, leaves, ..
        } = fixture(GridOptions::new(), 1);
        assert_eq!(tree.set_selected(leaves[0], true), 1);
        assert_eq!(tree.set_selected(leaves[0], true), 0);
    }

    #[test]
    fn test_rejects_rows_without_id_or_floating() {
        let mut tree = RowTree::new(GridContext::new(GridOptions::<u32>::new()));
        let no_id = tree.create_node(Some(1), None);
        assert_eq!(tree.set_selected(no_id, true), 0);
        assert_eq!(tree.is_selected(no_id), Some(SelectionState::Deselected));

        let pinned = tree.create_node(Some(2), Some("p".into()));
        tree.node_mut(pinned)
            .unwrap()
            .set_floating(FloatingPosition::Top);
        assert_eq!(tree.set_selected(pinned, true), 0);
        assert!(tree.selection().is_empty());
    }

    #[test]
    fn test_group_cascades_to_children() {
        let Fixture {
            mut tree,
            group,
            leaves,
        } = fixture(multi_gsc(), 3);
        assert_eq!(tree.set_selected(group, true), 4);
        for leaf in &leaves {
            assert_eq!(tree.is_selected(*leaf), Some(SelectionState::Selected));
        }

        // Only the leaf counts; the group's recompute is not part of the total.
        assert_eq!(tree.set_selected(leaves[1], false), 1);
        assert_eq!(tree.is_selected(group), Some(SelectionState::Mixed));
    }

    #[test]
    fn test_group_without_cascade() {
        let Fixture {
            mut tree,
            group,
            leaves,
        } = fixture(GridOptions::new().row_selection(RowSelection::Multiple), 2);
        assert_eq!(tree.set_selected(group, true), 1);
        assert_eq!(tree.is_selected(leaves[0]), Some(SelectionState::Deselected));
    }

    #[test]
    fn test_single_selection_clears_others() {
        let Fixture {
            mut tree, leaves, ..
        } = fixture(GridOptions::new(), 2);
        tree.set_selected(leaves[0], true);
        assert_eq!(tree.set_selected(leaves[1], true), 2);
        assert_eq!(tree.selected_nodes(), vec![leaves[1]]);
        assert_eq!(tree.selection().last_selected_node(), Some(leaves[1]));
    }

    #[test]
    fn test_clear_keeps_descendants_of_target() {
        let Fixture {
            mut tree,
            group,
            leaves,
        } = fixture(multi_gsc(), 2);
        tree.set_selected(leaves[0], true);
        assert_eq!(tree.set_selected_with(group, true, true), 2);
        assert_eq!(tree.is_selected(leaves[0]), Some(SelectionState::Selected));
        assert_eq!(tree.is_selected(group), Some(SelectionState::Selected));
    }

    #[test]
    fn test_one_selection_changed_per_action() {
        let Fixture {
            mut tree, group, ..
        } = fixture(multi_gsc(), 3);
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        tree.event_service()
            .add_global_listener(move |e| events_clone.lock().push(e.kind()));

        tree.set_selected(group, true);
        let events = events.lock();
        let changed = events
            .iter()
            .filter(|k| **k == GridEventKind::SelectionChanged)
            .count();
        let rows = events
            .iter()
            .filter(|k| **k == GridEventKind::RowSelected)
            .count();
        assert_eq!(changed, 1);
        assert_eq!(rows, 4);
        assert_eq!(events.last(), Some(&GridEventKind::SelectionChanged));
    }

    #[test]
    fn test_footer_delegates_to_group() {
        let Fixture {
            mut tree, group, ..
        } = fixture(GridOptions::new(), 1);
        let footer = tree.create_footer(group).unwrap();
        assert_eq!(tree.set_selected(footer, true), 1);
        assert_eq!(tree.node(group).unwrap().selected_raw(), SelectionState::Selected);
        assert_eq!(tree.node(footer).unwrap().selected_raw(), SelectionState::Deselected);
        assert_eq!(tree.is_selected(footer), Some(SelectionState::Selected));
    }

    #[test]
    fn test_select_and_deselect_all() {
        let Fixture {
            mut tree,
            group,
            leaves,
        } = fixture(multi_gsc(), 3);
        tree.set_children_after_filter(group, vec![leaves[0]]).unwrap();

        tree.select_all(true);
        assert_eq!(tree.is_selected(leaves[0]), Some(SelectionState::Selected));
        assert_eq!(tree.is_selected(leaves[1]), Some(SelectionState::Deselected));
        assert_eq!(tree.is_selected(group), Some(SelectionState::Mixed));

        tree.select_all(false);
        assert_eq!(tree.is_selected(group), Some(SelectionState::Selected));
        assert_eq!(tree.selected_rows(), vec![0, 1, 2]);

        tree.deselect_all(false);
        assert!(tree.selection().is_empty());
        assert_eq!(tree.is_selected(group), Some(SelectionState::Deselected));
        assert_eq!(tree.selection().last_selected_node(), None);
    }

    #[test]
    fn test_reset_selection_keeps_node_state() {
        let Fixture {
            mut tree, leaves, ..
        } = fixture(GridOptions::new(), 1);
        tree.set_selected(leaves[0], true);
        tree.reset_selection();
        assert!(tree.selection().is_empty());
        assert_eq!(tree.selection().last_selected_node(), None);
        assert_eq!(tree.is_selected(leaves[0]), Some(SelectionState::Selected));
    }

    #[test]
    fn test_empty_group_computes_mixed() {
        let mut tree = RowTree::new(GridContext::new(multi_gsc()));
        let group = tree.create_group("g", None, "g");
        tree.add_child(tree.root(), group).unwrap();
        assert!(tree.calculate_selected_from_children(group));
        assert_eq!(tree.is_selected(group), Some(SelectionState::Mixed));
    }
}
