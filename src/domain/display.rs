/*
Text rendering of trees via termtree.

Every node prints as its value (plus the color for red-black nodes). Children
are prefixed with `L:` / `R:`; a node with exactly one child shows the
missing side as `null` so left and right stay distinguishable.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::node::{BinaryTree, NodeRef, Side};
use crate::domain::variant::Variant;

pub trait TreeNodeConvert {
    fn to_text_tree(&self) -> Tree<String>;
}

fn labelled<V: Variant>(node: &NodeRef<'_, V>, prefix: &str) -> Tree<String> {
    let mut tree = Tree::new(format!("{prefix}{node}"));
    if node.is_leaf() {
        return tree;
    }
    for (side, tag) in [(Side::Left, "L: "), (Side::Right, "R: ")] {
        match node.child(side) {
            Some(child) => tree.push(labelled(&child, tag)),
            None => tree.push(Tree::new(format!("{tag}null"))),
        };
    }
    tree
}

impl<V: Variant> TreeNodeConvert for NodeRef<'_, V> {
    #[instrument(level = "trace")]
    fn to_text_tree(&self) -> Tree<String> {
        labelled(self, "")
    }
}

impl<V: Variant> TreeNodeConvert for BinaryTree<V> {
    fn to_text_tree(&self) -> Tree<String> {
        match self.root_ref() {
            Some(root) => root.to_text_tree(),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}
