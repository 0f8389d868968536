//! Row model views.
//!
//! Filtering and sorting themselves happen elsewhere; the row model view is
//! how the selection logic observes their effect: the order rows are
//! displayed in and which rows are visible.

use crate::node::NodeKey;
use crate::tree::{RowData, RowTree};

/// Kind of row model backing the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowModelType {
    /// All rows are held in memory; range selection is available.
    #[default]
    ClientSide,
    /// Rows are loaded in blocks on demand.
    Infinite,
    /// Rows are pushed in for the visible viewport only.
    Viewport,
    /// Grouping and loading are done by a server.
    ServerSide,
}

/// Ordered traversal over a row tree.
pub trait RowModelView<D: RowData> {
    /// The kind of row model.
    fn model_type(&self) -> RowModelType;

    /// Visits every node, groups included, in filtered and sorted display
    /// order. Collapsed groups are still descended into.
    fn for_each_node_after_filter_and_sort(&self, tree: &RowTree<D>, visit: &mut dyn FnMut(NodeKey));

    /// Visits every node that passes the filter, in group order.
    fn for_each_node_after_filter(&self, tree: &RowTree<D>, visit: &mut dyn FnMut(NodeKey));

    /// Visits every node in the tree, in group order.
    fn for_each_node(&self, tree: &RowTree<D>, visit: &mut dyn FnMut(NodeKey));

    /// The top-level nodes, in group order.
    fn top_level_nodes(&self, tree: &RowTree<D>) -> Vec<NodeKey>;
}

/// Collects the filtered and sorted traversal of `view` into a vector.
pub fn nodes_after_filter_and_sort<D: RowData>(
    view: &dyn RowModelView<D>,
    tree: &RowTree<D>,
) -> Vec<NodeKey> {
    let mut nodes = Vec::new();
    view.for_each_node_after_filter_and_sort(tree, &mut |key| nodes.push(key));
    nodes
}

/// Row model view over an in-memory tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientSideRowModel;

impl ClientSideRowModel {
    /// Creates the view.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Clone, Copy)]
enum ChildList {
    Group,
    Filter,
    Sort,
}

fn walk<D: RowData>(
    tree: &RowTree<D>,
    parent: NodeKey,
    list: ChildList,
    visit: &mut dyn FnMut(NodeKey),
) {
    let Some(node) = tree.node(parent) else {
        return;
    };
    let children = match list {
        ChildList::Group => node.children_after_group(),
        ChildList::Filter => node.children_after_filter(),
        ChildList::Sort => node.children_after_sort(),
    };
    for &child in children {
        visit(child);
        walk(tree, child, list, visit);
    }
}

impl<D: RowData> RowModelView<D> for ClientSideRowModel {
    fn model_type(&self) -> RowModelType {
        RowModelType::ClientSide
    }

    fn for_each_node_after_filter_and_sort(&self, tree: &RowTree<D>, visit: &mut dyn FnMut(NodeKey)) {
        walk(tree, tree.root(), ChildList::Sort, visit);
    }

    fn for_each_node_after_filter(&self, tree: &RowTree<D>, visit: &mut dyn FnMut(NodeKey)) {
        walk(tree, tree.root(), ChildList::Filter, visit);
    }

    fn for_each_node(&self, tree: &RowTree<D>, visit: &mut dyn FnMut(NodeKey)) {
        walk(tree, tree.root(), ChildList::Group, visit);
    }

    fn top_level_nodes(&self, tree: &RowTree<D>) -> Vec<NodeKey> {
        tree.node(tree.root())
            .map(|root| root.children_after_group().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GridContext;
    use crate::options::GridOptions;

    #[test]
    fn test_traversal_orders() {
        let mut tree = RowTree::new(GridContext::new(GridOptions::<u32>::new()));
        let root = tree.root();
        let group = tree.create_group("g", None, "g-1");
        tree.add_child(root, group).unwrap();
        let a = tree.create_node(Some(1), Some("a".into()));
        let b = tree.create_node(Some(2), Some("b".into()));
        let c = tree.create_node(Some(3), Some("c".into()));
        tree.add_child(group, a).unwrap();
        tree.add_child(group, b).unwrap();
        tree.add_child(root, c).unwrap();

        tree.set_children_after_filter(group, vec![a, b]).unwrap();
        tree.set_children_after_sort(group, vec![b, a]).unwrap();

        let view = ClientSideRowModel::new();
        assert_eq!(
            nodes_after_filter_and_sort(&view, &tree),
            vec![group, b, a, c]
        );

        tree.set_children_after_filter(group, vec![a]).unwrap();
        let mut filtered = Vec::new();
        view.for_each_node_after_filter(&tree, &mut |k| filtered.push(k));
        assert_eq!(filtered, vec![group, a, c]);

        let mut all = Vec::new();
        view.for_each_node(&tree, &mut |k| all.push(k));
        assert_eq!(all, vec![group, a, b, c]);

        assert_eq!(view.top_level_nodes(&tree), vec![group, c]);
        assert_eq!(RowModelView::<u32>::model_type(&view), RowModelType::ClientSide);
    }
}
