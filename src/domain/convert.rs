//! Deep copies, variant conversion and grafting.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::color::Color;
use crate::domain::error::{DomainResult, StructuralError};
use crate::domain::node::{BinaryTree, NodeId, NodeRef, PlainTree, RedBlackTree, Side, TreeNode};
use crate::domain::variant::{Plain, Variant};

impl<V: Variant> BinaryTree<V> {
    /// Copies the subtree under `start` into this tree's arena, converting
    /// tags on the way. Parent links of the copies point at their new
    /// structural parents. Returns the index of the copied `start`.
    pub(crate) fn import_subtree<W: Variant>(
        &mut self,
        start: NodeRef<'_, W>,
        convert: &impl Fn(&W) -> V,
    ) -> Option<Index> {
        let mut copies: HashMap<Index, Index> = HashMap::new();
        let mut top = None;

        // children are copied before their parent
        for node in start.iter_postorder() {
            let mut fresh = TreeNode::new(node.value(), convert(node.tag()));
            fresh.left = node.node.left.and_then(|i| copies.get(&i).copied());
            fresh.right = node.node.right.and_then(|i| copies.get(&i).copied());
            let children = [fresh.left, fresh.right];
            let idx = self.arena.insert(fresh);

            for child in children.into_iter().flatten() {
                if let Some(c) = self.arena.get_mut(child) {
                    c.parent = Some(idx);
                    c.owner = Some(idx);
                }
            }
            copies.insert(node.index, idx);
            top = Some(idx);
        }
        top
    }

    /// Copies the tree into a new, disjoint tree of the same variant.
    #[instrument(level = "debug", skip(self))]
    pub fn deep_copy(&self) -> Self {
        self.map_tags(|tag| tag.clone())
    }

    /// Copies the subtree rooted at `id` into a new tree.
    pub fn copy_subtree(&self, id: NodeId) -> DomainResult<Self> {
        let start = self.get(id)?;
        let mut copy = Self::new();
        copy.root = copy.import_subtree(start, &|tag: &V| tag.clone());
        Ok(copy)
    }

    /// Rebuilds the tree with every tag rewritten by `convert`.
    pub fn map_tags<W: Variant>(&self, convert: impl Fn(&V) -> W) -> BinaryTree<W> {
        let mut copy = BinaryTree::new();
        if let Some(root) = self.root_ref() {
            copy.root = copy.import_subtree(root, &convert);
        }
        copy
    }

    /// Moves `subtree` under `at` on the given side and wires its parent
    /// link. Grafting an empty tree clears the slot.
    #[instrument(level = "debug", skip(self, subtree))]
    pub fn graft(&mut self, at: NodeId, side: Side, subtree: BinaryTree<V>) -> DomainResult<Option<NodeId>> {
        let pidx = self.resolve(at)?;
        let Some(root) = subtree.root_ref() else {
            self.set_child(at, side, None)?;
            return Ok(None);
        };

        let idx = self
            .import_subtree(root, &|tag: &V| tag.clone())
            .ok_or(StructuralError::StaleNode)?;
        let child = self.handle(idx);
        self.set_child(at, side, Some(child))?;
        self.node_at_mut(idx)?.parent = Some(pidx);
        debug!(nodes = subtree.len(), "grafted subtree");
        Ok(Some(child))
    }
}

impl PlainTree {
    /// Rebuilds the tree as a red-black tree with every node set to `color`.
    ///
    /// The result is not checked against the red-black rules.
    #[instrument(level = "debug", skip(self))]
    pub fn colorize(&self, color: Color) -> RedBlackTree {
        self.map_tags(|_| color)
    }
}

impl RedBlackTree {
    pub fn from_plain(tree: &PlainTree, color: Color) -> Self {
        tree.colorize(color)
    }

    /// Drops the colors, keeping structure and values.
    pub fn to_plain(&self) -> PlainTree {
        self.map_tags(|_| Plain)
    }
}
