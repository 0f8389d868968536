//! Text rendering of a row tree for debugging.

use std::fmt::Write;

use horizon_grid_core::TreeFormatOptions;

use crate::error::GridResult;
use crate::node::{NodeKey, RowNode};
use crate::tree::{RowData, RowTree};

/// Renders a [`RowTree`] as indented text.
///
/// ```
/// use horizon_grid::{GridContext, GridOptions, RowTree, RowTreeDebug};
///
/// let mut tree = RowTree::new(GridContext::new(GridOptions::<u8>::new()));
/// let group = tree.create_group("Fruit", None, "g-fruit");
/// tree.add_child(tree.root(), group).unwrap();
///
/// let output = RowTreeDebug::new().format_tree(&tree).unwrap();
/// assert!(output.contains("Fruit"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RowTreeDebug {
    options: TreeFormatOptions,
}

impl RowTreeDebug {
    /// Create a renderer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole tree, starting at the root.
    pub fn format_tree<D: RowData>(&self, tree: &RowTree<D>) -> GridResult<String> {
        let mut output = String::new();
        let _ = writeln!(output, "Row Tree ({} nodes):", tree.len());
        if tree.is_empty() {
            output.push_str("  (empty)\n");
            return Ok(output);
        }
        self.format_into(tree, tree.root(), 0, true, &mut output)?;
        Ok(output)
    }

    /// Format the subtree below `key`.
    pub fn format_subtree<D: RowData>(&self, tree: &RowTree<D>, key: NodeKey) -> GridResult<String> {
        let mut output = String::new();
        self.format_into(tree, key, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_into<D: RowData>(
        &self,
        tree: &RowTree<D>,
        key: NodeKey,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> GridResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let node = tree.get(key)?;

        output.push_str(&self.options.line_prefix(depth, is_last));
        output.push_str(&label(node));
        if self.options.show_ids {
            let _ = write!(output, " [{key:?}]");
        }
        if self.options.show_types {
            let _ = write!(output, " ({})", kind(node));
        }
        output.push('\n');

        if self.options.show_properties {
            let prefix = self.options.detail_prefix(depth);
            let selected = tree.is_selected(key).unwrap_or_default();
            let _ = writeln!(output, "{prefix}  .selected = {selected:?}");
            if node.is_group() {
                let _ = writeln!(output, "{prefix}  .expanded = {}", node.is_expanded());
            }
            if let Some(index) = node.row_index_string() {
                let _ = writeln!(output, "{prefix}  .row_index = {index}");
            }
        }

        let children = node.children_after_group();
        for (i, &child) in children.iter().enumerate() {
            self.format_into(tree, child, depth + 1, i + 1 == children.len(), output)?;
        }
        Ok(())
    }
}

fn label<D>(node: &RowNode<D>) -> String {
    match (node.group_key(), node.id()) {
        (Some(group_key), _) => group_key.to_string(),
        (None, Some(id)) => id.to_string(),
        (None, None) => "(no id)".to_string(),
    }
}

fn kind<D>(node: &RowNode<D>) -> &'static str {
    if node.is_footer() {
        "footer"
    } else if node.is_flower() {
        "detail"
    } else if node.is_group() {
        "group"
    } else {
        "row"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GridContext;
    use crate::options::GridOptions;
    use horizon_grid_core::TreeStyle;

    fn sample() -> (RowTree<u8>, NodeKey) {
        let mut tree = RowTree::new(GridContext::new(GridOptions::new()));
        let root = tree.root();
        let group = tree.create_group("Fruit", None, "g-fruit");
        let apple = tree.create_node(Some(1), Some("apple".into()));
        let pear = tree.create_node(Some(2), Some("pear".into()));
        tree.add_child(root, group).unwrap();
        tree.add_child(group, apple).unwrap();
        tree.add_child(group, pear).unwrap();
        (tree, group)
    }

    #[test]
    fn test_format_empty_tree() {
        let tree = RowTree::new(GridContext::new(GridOptions::<u8>::new()));
        let output = RowTreeDebug::new().format_tree(&tree).unwrap();
        assert!(output.contains("Row Tree (1 nodes)"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_format_hierarchy() {
        let (tree, _) = sample();
        let output = RowTreeDebug::new().format_tree(&tree).unwrap();
        assert!(output.contains("ROOT_NODE_ID"));
        assert!(output.contains("Fruit"));
        assert!(output.contains("apple"));
        assert!(output.contains("(group)"));
        assert!(output.contains("(row)"));
    }

    #[test]
    fn test_format_ascii_subtree() {
        let (mut tree, group) = sample();
        tree.set_selected(group, true);
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let output = RowTreeDebug::with_options(options)
            .format_subtree(&tree, group)
            .unwrap();
        assert_eq!(output, "Fruit\n+-- apple\n`-- pear\n");
    }

    #[test]
    fn test_format_properties() {
        let (mut tree, group) = sample();
        tree.set_selected(group, true);
        let output = RowTreeDebug::with_options(TreeFormatOptions::detailed())
            .format_subtree(&tree, group)
            .unwrap();
        assert!(output.contains(".selected = Selected"));
        assert!(output.contains(".expanded = false"));
    }

    #[test]
    fn test_max_depth() {
        let (tree, _) = sample();
        let options = TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        };
        let output = RowTreeDebug::with_options(options).format_tree(&tree).unwrap();
        assert!(output.contains("Fruit"));
        assert!(!output.contains("apple"));
    }
}
