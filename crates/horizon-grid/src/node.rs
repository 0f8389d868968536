//! Row nodes.
//!
//! A [`RowNode`] is one row or one group in the grid. Nodes live in a
//! [`RowTree`](crate::RowTree) arena and refer to each other through
//! [`NodeKey`] handles; the tree is the only owner. Reads go through the
//! accessors here, while every mutation that must notify observers goes
//! through the tree so it can reach the node's listeners and the grid-wide
//! event service.

use slotmap::new_key_type;

use crate::events::RowNodeSignals;
use crate::value::{ColumnId, ColumnValues};

new_key_type! {
    /// A stable handle to a node in a [`RowTree`](crate::RowTree).
    ///
    /// Keys are generational: a key to a removed node never resolves to a
    /// node created later in the same slot.
    pub struct NodeKey;
}

/// Id given to the synthetic root node of every tree.
pub const ROOT_NODE_ID: &str = "ROOT_NODE_ID";

/// Prefix of the id given to group footer nodes.
pub const FOOTER_ID_PREFIX: &str = "rowGroupFooter_";

/// Three-valued selection state of a node.
///
/// `Mixed` only arises for group nodes whose children disagree while
/// children-select-parent mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionState {
    /// The node is selected.
    Selected,
    /// The node is not selected.
    #[default]
    Deselected,
    /// Some but not all of the node's children are selected.
    Mixed,
}

impl SelectionState {
    /// Returns `true` only for [`SelectionState::Selected`].
    pub fn is_selected(self) -> bool {
        self == SelectionState::Selected
    }

    /// Returns `true` only for [`SelectionState::Mixed`].
    pub fn is_mixed(self) -> bool {
        self == SelectionState::Mixed
    }

    /// `Some(true)`, `Some(false)`, or `None` for mixed.
    pub fn as_option(self) -> Option<bool> {
        match self {
            SelectionState::Selected => Some(true),
            SelectionState::Deselected => Some(false),
            SelectionState::Mixed => None,
        }
    }
}

impl From<bool> for SelectionState {
    fn from(selected: bool) -> Self {
        if selected {
            SelectionState::Selected
        } else {
            SelectionState::Deselected
        }
    }
}

impl From<Option<bool>> for SelectionState {
    fn from(selected: Option<bool>) -> Self {
        selected.map_or(SelectionState::Mixed, SelectionState::from)
    }
}

/// Where a floating (pinned) row is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatingPosition {
    /// A regular, scrolling row.
    #[default]
    None,
    /// Pinned above the body.
    Top,
    /// Pinned below the body.
    Bottom,
}

/// One row or group in the grid.
pub struct RowNode<D> {
    pub(crate) id: Option<String>,
    pub(crate) data: Option<D>,

    pub(crate) parent: Option<NodeKey>,
    pub(crate) level: i32,
    pub(crate) ui_level: i32,
    pub(crate) children_after_group: Vec<NodeKey>,
    pub(crate) children_after_filter: Vec<NodeKey>,
    pub(crate) children_after_sort: Vec<NodeKey>,
    pub(crate) all_leaf_children: Vec<NodeKey>,
    pub(crate) child_index: usize,
    pub(crate) first_child: bool,
    pub(crate) last_child: bool,
    pub(crate) all_children_count: usize,
    pub(crate) expanded: bool,

    pub(crate) group: bool,
    pub(crate) leaf_group: bool,
    pub(crate) group_data: Option<ColumnValues>,
    pub(crate) row_group_column: Option<ColumnId>,
    pub(crate) group_key: Option<String>,
    pub(crate) footer: bool,
    pub(crate) sibling: Option<NodeKey>,

    pub(crate) can_flower: bool,
    pub(crate) flower: bool,
    pub(crate) child_flower: Option<NodeKey>,

    pub(crate) agg_data: Option<ColumnValues>,

    pub(crate) row_height: Option<f64>,
    pub(crate) row_top: Option<f64>,
    pub(crate) previous_row_top: Option<f64>,
    pub(crate) row_index: Option<usize>,
    pub(crate) floating: FloatingPosition,

    pub(crate) selected: SelectionState,

    pub(crate) quick_filter_aggregate_text: Option<String>,

    /// Lazily created; local events fire only once this exists.
    pub(crate) signals: Option<Box<RowNodeSignals<D>>>,
}

impl<D> RowNode<D> {
    pub(crate) fn new() -> Self {
        Self {
            id: None,
            data: None,
            parent: None,
            level: 0,
            ui_level: 0,
            children_after_group: Vec::new(),
            children_after_filter: Vec::new(),
            children_after_sort: Vec::new(),
            all_leaf_children: Vec::new(),
            child_index: 0,
            first_child: false,
            last_child: false,
            all_children_count: 0,
            expanded: false,
            group: false,
            leaf_group: false,
            group_data: None,
            row_group_column: None,
            group_key: None,
            footer: false,
            sibling: None,
            can_flower: false,
            flower: false,
            child_flower: None,
            agg_data: None,
            row_height: None,
            row_top: None,
            previous_row_top: None,
            row_index: None,
            floating: FloatingPosition::None,
            selected: SelectionState::Deselected,
            quick_filter_aggregate_text: None,
            signals: None,
        }
    }

    pub(crate) fn new_root() -> Self {
        Self {
            id: Some(ROOT_NODE_ID.to_string()),
            level: -1,
            group: true,
            expanded: true,
            ..Self::new()
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The row id, once known.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The row data.
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Mutable access to the row data, for value services.
    ///
    /// Writing through this does not notify anyone; use
    /// [`RowTree::set_data_value`](crate::RowTree::set_data_value) for that.
    pub fn data_mut(&mut self) -> Option<&mut D> {
        self.data.as_mut()
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// The parent node, `None` for the root and detached nodes.
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Depth in the group hierarchy; top-level rows are level 0.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Depth used for indentation, which can differ from `level` when
    /// groups are hidden.
    pub fn ui_level(&self) -> i32 {
        self.ui_level
    }

    /// Direct children after grouping.
    pub fn children_after_group(&self) -> &[NodeKey] {
        &self.children_after_group
    }

    /// Direct children that pass the current filter.
    pub fn children_after_filter(&self) -> &[NodeKey] {
        &self.children_after_filter
    }

    /// Filtered direct children in display order.
    pub fn children_after_sort(&self) -> &[NodeKey] {
        &self.children_after_sort
    }

    /// Every leaf descendant.
    pub fn all_leaf_children(&self) -> &[NodeKey] {
        &self.all_leaf_children
    }

    /// Position among the parent's sorted children.
    pub fn child_index(&self) -> usize {
        self.child_index
    }

    /// Whether this is the first of the parent's sorted children.
    pub fn is_first_child(&self) -> bool {
        self.first_child
    }

    /// Whether this is the last of the parent's sorted children.
    pub fn is_last_child(&self) -> bool {
        self.last_child
    }

    /// Number of descendants that pass the current filter.
    pub fn all_children_count(&self) -> usize {
        self.all_children_count
    }

    /// Whether the group is open.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    /// Whether this node is a group.
    pub fn is_group(&self) -> bool {
        self.group
    }

    /// Whether this group only holds leaf rows.
    pub fn is_leaf_group(&self) -> bool {
        self.leaf_group
    }

    /// Group values by column.
    pub fn group_data(&self) -> Option<&ColumnValues> {
        self.group_data.as_ref()
    }

    /// The column this group was created for.
    pub fn row_group_column(&self) -> Option<&ColumnId> {
        self.row_group_column.as_ref()
    }

    /// The group key.
    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    /// Whether this node is a group footer.
    pub fn is_footer(&self) -> bool {
        self.footer
    }

    /// For a footer the group it summarises, for a group its footer.
    pub fn sibling(&self) -> Option<NodeKey> {
        self.sibling
    }

    /// Whether the node can expand into a detail row despite having no children.
    pub fn can_flower(&self) -> bool {
        self.can_flower
    }

    /// Whether this node is a synthetic detail row.
    pub fn is_flower(&self) -> bool {
        self.flower
    }

    /// The detail row of this node, if one was created.
    pub fn child_flower(&self) -> Option<NodeKey> {
        self.child_flower
    }

    /// Whether the node can be expanded.
    pub fn is_expandable(&self) -> bool {
        self.group || self.can_flower
    }

    // =========================================================================
    // Aggregation and layout
    // =========================================================================

    /// Aggregated values by column.
    pub fn agg_data(&self) -> Option<&ColumnValues> {
        self.agg_data.as_ref()
    }

    /// Row height in pixels.
    pub fn row_height(&self) -> Option<f64> {
        self.row_height
    }

    /// Vertical position in pixels.
    pub fn row_top(&self) -> Option<f64> {
        self.row_top
    }

    /// Vertical position before the last move, for animation.
    pub fn previous_row_top(&self) -> Option<f64> {
        self.previous_row_top
    }

    /// Index among displayed rows.
    pub fn row_index(&self) -> Option<usize> {
        self.row_index
    }

    /// Where the row is pinned, if anywhere.
    pub fn floating(&self) -> FloatingPosition {
        self.floating
    }

    /// Whether this is a pinned summary row.
    pub fn is_floating(&self) -> bool {
        self.floating != FloatingPosition::None
    }

    /// The row index qualified by pin position: `t-0`, `b-2`, or `5`.
    pub fn row_index_string(&self) -> Option<String> {
        let index = self.row_index?;
        Some(match self.floating {
            FloatingPosition::Top => format!("t-{index}"),
            FloatingPosition::Bottom => format!("b-{index}"),
            FloatingPosition::None => index.to_string(),
        })
    }

    // =========================================================================
    // Selection and caches
    // =========================================================================

    /// The node's own selection field.
    ///
    /// Footers do not keep their own selection; ask the tree via
    /// [`RowTree::is_selected`](crate::RowTree::is_selected) instead.
    pub fn selected_raw(&self) -> SelectionState {
        self.selected
    }

    /// Cached text used by the quick filter.
    pub fn quick_filter_aggregate_text(&self) -> Option<&str> {
        self.quick_filter_aggregate_text.as_deref()
    }

    /// Whether a listener block has been created for this node.
    pub fn has_listeners(&self) -> bool {
        self.signals.is_some()
    }

    // =========================================================================
    // Configuration (no notification)
    // =========================================================================

    /// Pins the row to the top or bottom.
    pub fn set_floating(&mut self, floating: FloatingPosition) {
        self.floating = floating;
    }

    /// Marks a group as holding only leaf rows.
    pub fn set_leaf_group(&mut self, leaf_group: bool) {
        self.leaf_group = leaf_group;
    }

    /// Allows the node to expand into a detail row.
    pub fn set_can_flower(&mut self, can_flower: bool) {
        self.can_flower = can_flower;
    }

    /// Sets the initial selection without notifying anyone.
    ///
    /// Used when a node is (re)built and its state is reconciled from the
    /// selection controller.
    pub fn set_selected_initial_value(&mut self, selected: SelectionState) {
        self.selected = selected;
    }

    /// Sets the quick filter text cache.
    pub fn set_quick_filter_aggregate_text(&mut self, text: impl Into<String>) {
        self.quick_filter_aggregate_text = Some(text.into());
    }

    /// Clears the quick filter text cache.
    pub fn reset_quick_filter_aggregate_text(&mut self) {
        self.quick_filter_aggregate_text = None;
    }
}

/// A detached snapshot of a node's former identity.
///
/// When a live node is reused for a different row through
/// [`RowTree::set_data_and_id`](crate::RowTree::set_data_and_id), the
/// selection controller keeps one of these so that the old row's selection
/// is not lost. Daemon rows never take part in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonRow<D> {
    pub(crate) id: String,
    pub(crate) data: Option<D>,
    pub(crate) selected: SelectionState,
    pub(crate) level: i32,
}

impl<D> DaemonRow<D> {
    /// The old row id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The old row data.
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Selection state at the time of the swap.
    pub fn selected(&self) -> SelectionState {
        self.selected
    }

    /// Level at the time of the swap.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Daemon rows are always detached snapshots.
    pub fn is_daemon(&self) -> bool {
        true
    }
}

impl<D: Clone> RowNode<D> {
    /// Snapshots the current identity, if the node has one.
    pub(crate) fn create_daemon(&self) -> Option<DaemonRow<D>> {
        let id = self.id.clone()?;
        Some(DaemonRow {
            id,
            data: self.data.clone(),
            selected: self.selected,
            level: self.level,
        })
    }
}
