//! The row tree arena.
//!
//! [`RowTree`] owns every [`RowNode`] of a grid in a slot map and is the
//! single entry point for mutating them. Parent, sibling and child links are
//! [`NodeKey`]s, so the hierarchy never forms reference cycles.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{GridContext, GridOptions, RowTree};
//!
//! let mut tree = RowTree::new(GridContext::new(GridOptions::<&str>::new()));
//! let root = tree.root();
//!
//! let group = tree.create_group("Fruit", None, "group-fruit");
//! tree.add_child(root, group).unwrap();
//!
//! let apple = tree.create_node(Some("apple"), Some("1".into()));
//! tree.add_child(group, apple).unwrap();
//!
//! assert!(tree.is_ancestor_of(group, apple));
//! assert_eq!(tree.node(apple).unwrap().level(), 1);
//! ```

use std::sync::Arc;

use slotmap::SlotMap;

use crate::context::GridContext;
use crate::error::{GridError, GridResult};
use crate::event_service::EventService;
use crate::node::{NodeKey, RowNode, SelectionState, FOOTER_ID_PREFIX};
use crate::selection::SelectionController;
use crate::value::ColumnId;

/// Bounds required of row data.
///
/// Data is cloned into change notifications and daemon snapshots; wrap it in
/// an `Arc` if cloning is expensive.
pub trait RowData: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> RowData for T {}

/// Arena owning every node of one grid.
pub struct RowTree<D: RowData> {
    pub(crate) nodes: SlotMap<NodeKey, RowNode<D>>,
    pub(crate) root: NodeKey,
    pub(crate) context: GridContext<D>,
    pub(crate) selection: SelectionController<D>,
}

impl<D: RowData> RowTree<D> {
    /// Creates a tree holding only its root node.
    pub fn new(context: GridContext<D>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(RowNode::new_root());
        Self {
            nodes,
            root,
            context,
            selection: SelectionController::new(),
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// The synthetic root node; its children are the top-level rows.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// The context this tree was built with.
    pub fn context(&self) -> &GridContext<D> {
        &self.context
    }

    /// The grid-wide event service.
    pub fn event_service(&self) -> &Arc<EventService> {
        &self.context.event_service
    }

    /// The selection controller.
    pub fn selection(&self) -> &SelectionController<D> {
        &self.selection
    }

    /// Returns the node for `key`.
    pub fn node(&self, key: NodeKey) -> Option<&RowNode<D>> {
        self.nodes.get(key)
    }

    /// Returns the node for `key` for configuration.
    ///
    /// Only settings that notify nobody are reachable this way; use the
    /// tree's setters for anything observers care about.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut RowNode<D>> {
        self.nodes.get_mut(key)
    }

    /// Returns `true` if `key` refers to a live node.
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub(crate) fn get(&self, key: NodeKey) -> GridResult<&RowNode<D>> {
        self.nodes.get(key).ok_or(GridError::InvalidNode(key))
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> GridResult<&mut RowNode<D>> {
        self.nodes.get_mut(key).ok_or(GridError::InvalidNode(key))
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a detached row node.
    ///
    /// The id is resolved the same way as [`set_id`](Self::set_id): derived
    /// from the data when a row id getter is configured, otherwise `id` is
    /// used as given.
    pub fn create_node(&mut self, data: Option<D>, id: Option<String>) -> NodeKey {
        let mut node = RowNode::new();
        node.data = data;
        node.id = self.resolve_id(node.data.as_ref(), id);
        self.nodes.insert(node)
    }

    /// Creates a detached group node.
    ///
    /// Group ids are assigned directly; they are never derived from data.
    pub fn create_group(
        &mut self,
        group_key: impl Into<String>,
        row_group_column: Option<ColumnId>,
        id: impl Into<String>,
    ) -> NodeKey {
        let mut node = RowNode::new();
        node.group = true;
        node.group_key = Some(group_key.into());
        node.row_group_column = row_group_column;
        node.id = Some(id.into());
        self.nodes.insert(node)
    }

    /// Creates the footer of `group` and links the two as siblings.
    ///
    /// The footer is not added to any child list; it is placed in the
    /// displayed rows by whoever flattens the tree.
    pub fn create_footer(&mut self, group: NodeKey) -> GridResult<NodeKey> {
        let group_node = self.get(group)?;
        if !group_node.group {
            return Err(GridError::NotAGroup(group));
        }

        let mut footer = RowNode::new();
        footer.footer = true;
        footer.group = true;
        footer.sibling = Some(group);
        footer.id = group_node
            .id
            .as_ref()
            .map(|id| format!("{FOOTER_ID_PREFIX}{id}"));
        footer.data = group_node.data.clone();
        footer.group_key = group_node.group_key.clone();
        footer.row_group_column = group_node.row_group_column.clone();
        footer.level = group_node.level;
        footer.ui_level = group_node.ui_level;
        footer.parent = group_node.parent;

        let key = self.nodes.insert(footer);
        self.get_mut(group)?.sibling = Some(key);
        Ok(key)
    }

    /// Creates the detail (flower) row of `master`.
    pub fn create_flower(&mut self, master: NodeKey) -> GridResult<NodeKey> {
        let master_node = self.get(master)?;
        let mut flower = RowNode::new();
        flower.flower = true;
        flower.parent = Some(master);
        flower.level = master_node.level + 1;
        flower.id = master_node.id.as_ref().map(|id| format!("detail_{id}"));
        flower.data = master_node.data.clone();

        let key = self.nodes.insert(flower);
        let master_node = self.get_mut(master)?;
        master_node.can_flower = true;
        master_node.child_flower = Some(key);
        Ok(key)
    }

    /// Appends `child` to the end of `parent`'s child lists.
    ///
    /// A child that already has a parent is moved. Levels of the moved
    /// subtree are updated and leaf lists of all ancestors refreshed.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> GridResult<()> {
        let parent_node = self.get(parent)?;
        self.get(child)?;
        if !parent_node.group {
            return Err(GridError::NotAGroup(parent));
        }
        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(GridError::CircularParentage { parent, child });
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.detach(old_parent, child);
            self.refresh_leaf_children_upwards(old_parent);
            self.refresh_child_metadata(old_parent)?;
        }

        let level = self.nodes[parent].level + 1;
        {
            let parent_node = &mut self.nodes[parent];
            parent_node.children_after_group.push(child);
            parent_node.children_after_filter.push(child);
            parent_node.children_after_sort.push(child);
        }
        self.nodes[child].parent = Some(parent);
        self.set_subtree_level(child, level);
        self.refresh_leaf_children_upwards(parent);
        self.refresh_child_metadata(parent)
    }

    /// Sets which of `parent`'s children pass the filter.
    ///
    /// The sorted list keeps its current order for children that remain;
    /// newly visible children are appended in filter order.
    pub fn set_children_after_filter(&mut self, parent: NodeKey, children: Vec<NodeKey>) -> GridResult<()> {
        let parent_node = self.get(parent)?;
        for &child in &children {
            if !parent_node.children_after_group.contains(&child) {
                return Err(GridError::DetachedNode { parent, child });
            }
        }

        let mut sorted: Vec<NodeKey> = parent_node
            .children_after_sort
            .iter()
            .copied()
            .filter(|key| children.contains(key))
            .collect();
        for &child in &children {
            if !sorted.contains(&child) {
                sorted.push(child);
            }
        }

        let parent_node = self.get_mut(parent)?;
        parent_node.children_after_filter = children;
        parent_node.children_after_sort = sorted;
        self.refresh_child_metadata(parent)
    }

    /// Sets the display order of `parent`'s filtered children.
    pub fn set_children_after_sort(&mut self, parent: NodeKey, children: Vec<NodeKey>) -> GridResult<()> {
        let parent_node = self.get(parent)?;
        for &child in &children {
            if !parent_node.children_after_filter.contains(&child) {
                return Err(GridError::DetachedNode { parent, child });
            }
        }
        self.get_mut(parent)?.children_after_sort = children;
        self.refresh_child_metadata(parent)
    }

    /// Recomputes child index and first/last flags of `parent`'s sorted
    /// children, and `parent`'s count of filtered descendants.
    ///
    /// Changes are applied through the setters, so observers of the
    /// children are notified.
    pub fn refresh_child_metadata(&mut self, parent: NodeKey) -> GridResult<()> {
        let children = self.get(parent)?.children_after_sort.clone();
        let last = children.len().saturating_sub(1);
        for (index, &child) in children.iter().enumerate() {
            self.set_child_index(child, index)?;
            self.set_first_child(child, index == 0)?;
            self.set_last_child(child, index == last)?;
        }
        let count = self.count_filtered_descendants(parent);
        self.set_all_children_count(parent, count)
    }

    /// Recomputes `all_leaf_children` of `key` and its descendants.
    pub fn refresh_leaf_children(&mut self, key: NodeKey) -> GridResult<()> {
        self.get(key)?;
        for node_key in self.post_order(key) {
            let node = &self.nodes[node_key];
            if !node.group {
                continue;
            }
            let mut leaves = Vec::new();
            for &child in &node.children_after_group {
                let child_node = &self.nodes[child];
                if child_node.group {
                    leaves.extend_from_slice(&child_node.all_leaf_children);
                } else {
                    leaves.push(child);
                }
            }
            self.nodes[node_key].all_leaf_children = leaves;
        }
        Ok(())
    }

    /// Removes `key` and its whole subtree from the tree.
    ///
    /// Removed nodes are forgotten by the selection controller. The root
    /// cannot be removed; asking for it clears its children instead.
    pub fn remove_subtree(&mut self, key: NodeKey) -> GridResult<()> {
        self.get(key)?;
        if key == self.root {
            for child in self.nodes[self.root].children_after_group.clone() {
                self.remove_subtree(child)?;
            }
            return Ok(());
        }

        let parent = self.nodes[key].parent;
        if let Some(parent) = parent {
            self.detach(parent, key);
        }

        for node_key in self.post_order(key) {
            if let Some(node) = self.nodes.remove(node_key) {
                self.selection.forget(node_key);
                for linked in [node.sibling, node.child_flower].into_iter().flatten() {
                    if self.nodes.get(linked).is_some_and(|n| n.footer || n.flower) {
                        self.nodes.remove(linked);
                        self.selection.forget(linked);
                    }
                }
            }
        }

        if let Some(parent) = parent {
            self.refresh_leaf_children_upwards(parent);
            self.refresh_child_metadata(parent)?;
        }
        Ok(())
    }

    fn detach(&mut self, parent: NodeKey, child: NodeKey) {
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children_after_group.retain(|k| *k != child);
            parent_node.children_after_filter.retain(|k| *k != child);
            parent_node.children_after_sort.retain(|k| *k != child);
        }
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
    }

    fn set_subtree_level(&mut self, key: NodeKey, level: i32) {
        let mut stack = vec![(key, level)];
        while let Some((node_key, node_level)) = stack.pop() {
            let node = &mut self.nodes[node_key];
            node.level = node_level;
            stack.extend(
                node.children_after_group
                    .iter()
                    .map(|&child| (child, node_level + 1)),
            );
        }
    }

    fn refresh_leaf_children_upwards(&mut self, from: NodeKey) {
        let mut current = Some(from);
        while let Some(key) = current {
            let mut leaves = Vec::new();
            for &child in &self.nodes[key].children_after_group {
                let child_node = &self.nodes[child];
                if child_node.group {
                    leaves.extend_from_slice(&child_node.all_leaf_children);
                } else {
                    leaves.push(child);
                }
            }
            let node = &mut self.nodes[key];
            node.all_leaf_children = leaves;
            current = node.parent;
        }
    }

    fn count_filtered_descendants(&self, key: NodeKey) -> usize {
        self.nodes[key]
            .children_after_filter
            .iter()
            .map(|&child| 1 + self.count_filtered_descendants(child))
            .sum()
    }

    pub(crate) fn resolve_id(&self, data: Option<&D>, id: Option<String>) -> Option<String> {
        match self.context.options.get_row_id_getter() {
            Some(getter) => data.map(|data| getter(data)),
            None => id,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The selection state of `key`; footers report their group's state.
    pub fn is_selected(&self, key: NodeKey) -> Option<SelectionState> {
        let node = self.nodes.get(key)?;
        if node.footer {
            return node
                .sibling
                .and_then(|sibling| self.nodes.get(sibling))
                .map(|sibling| sibling.selected);
        }
        Some(node.selected)
    }

    /// Visits the subtree of `key` depth first, children (in group order)
    /// before their parent.
    pub fn depth_first_search<F>(&self, key: NodeKey, mut visit: F)
    where
        F: FnMut(NodeKey, &RowNode<D>),
    {
        for node_key in self.post_order(key) {
            visit(node_key, &self.nodes[node_key]);
        }
    }

    /// Keys of the subtree of `key` in post-order.
    pub(crate) fn post_order(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        if !self.nodes.contains_key(key) {
            return order;
        }
        // (node, children already pushed)
        let mut stack = vec![(key, false)];
        while let Some((node_key, expanded)) = stack.pop() {
            if expanded {
                order.push(node_key);
                continue;
            }
            stack.push((node_key, true));
            for &child in self.nodes[node_key].children_after_group.iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Returns `true` if `ancestor` is found walking up from `candidate`.
    ///
    /// A node is not its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: NodeKey, candidate: NodeKey) -> bool {
        let mut current = self.nodes.get(candidate).and_then(|n| n.parent);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.nodes.get(key).and_then(|n| n.parent);
        }
        false
    }

    /// Finds the group for `column` that `key` leads, if any.
    ///
    /// Walks up while each node is the first child of its parent and
    /// returns the first ancestor grouped by `column`. Returns `None` as
    /// soon as the first-child chain breaks or the root is reached. A nested
    /// group cell uses this to decide whether it shows its ancestor's label.
    pub fn first_child_of_first_group_ancestor_for(
        &self,
        key: NodeKey,
        column: &ColumnId,
    ) -> Option<NodeKey> {
        let mut current = self.nodes.get(key)?;
        loop {
            let parent_key = current.parent?;
            if !current.first_child || parent_key == self.root {
                return None;
            }
            let parent = self.nodes.get(parent_key)?;
            if parent.row_group_column.as_ref() == Some(column) {
                return Some(parent_key);
            }
            current = parent;
        }
    }

    /// Whether `key` can be expanded.
    pub fn is_expandable(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(RowNode::is_expandable)
    }
}
