//! Shift-click range selection.

use horizon_grid_core::logging::{span_names, targets};
use horizon_grid_core::PerfSpan;

use crate::event_service::GridEvent;
use crate::node::NodeKey;
use crate::row_model::nodes_after_filter_and_sort;
use crate::tree::{RowData, RowTree};

impl<D: RowData> RowTree<D> {
    /// Selects every displayed row between the anchor and `target`.
    ///
    /// Rows are walked once in filtered and sorted order; rows inside the
    /// range (and children of the closing endpoint) are selected, every
    /// other row is deselected. Without an anchor the range runs from
    /// `target` to the last row. Groups are skipped when they derive their state from
    /// their children, and are recomputed at the end instead. The anchor
    /// itself does not move.
    pub(crate) fn select_range(&mut self, target: NodeKey) -> usize {
        let _span = PerfSpan::new(span_names::RANGE_SELECTION);
        let anchor = self.selection.last_selected_node();
        let group_selects_children = self.context.options.is_group_selects_children();
        let row_model = self.context.row_model.clone();
        let is_endpoint = |key: NodeKey| key == target || Some(key) == anchor;

        let mut first_row_hit = false;
        let mut last_row_hit = false;
        let mut last_row: Option<NodeKey> = None;
        let mut updated = 0;

        for key in nodes_after_filter_and_sort(row_model.as_ref(), self) {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            let is_group = node.group;
            let looking_for_last_row = first_row_hit && !last_row_hit;
            if !first_row_hit && is_endpoint(key) {
                first_row_hit = true;
            }

            let skip_group = group_selects_children && is_group;
            if !skip_group {
                let in_range = first_row_hit && !last_row_hit;
                let child_of_last_row = last_row.is_some_and(|last| self.is_ancestor_of(last, key));
                if self.select_this_node(key, (in_range || child_of_last_row).into()) {
                    updated += 1;
                }
            }

            if looking_for_last_row && is_endpoint(key) {
                last_row_hit = true;
                last_row = Some(key);
            }
        }

        if group_selects_children {
            self.calculate_selected_for_all_group_nodes();
        }

        tracing::debug!(target: targets::SELECTION, ?anchor, ?target, updated, "range selected");
        self.context
            .event_service
            .dispatch_event(GridEvent::SelectionChanged);
        updated
    }
}
