//! Arena-backed binary tree with explicit parent back-references.
//!
//! Nodes live in a generational arena owned by the tree. Structural edges
//! (`left`/`right`) are exclusive: every node has at most one owner. The
//! `parent` link is a plain handle that callers set themselves; it is never
//! derived from the structural edges and never followed by the tree's own
//! algorithms.

use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::color::Color;
use crate::domain::error::{DomainResult, StructuralError};
use crate::domain::variant::{Plain, Variant};

/// Handle to a node inside one specific tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tree: Uuid,
    pub(crate) index: Index,
}

/// Structural child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Node payload stored in the arena.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode<V> {
    pub(crate) value: i64,
    pub(crate) tag: V,
    pub(crate) left: Option<Index>,
    pub(crate) right: Option<Index>,
    /// Caller-managed back-reference
    pub(crate) parent: Option<Index>,
    /// Node holding this one in its left or right slot
    pub(crate) owner: Option<Index>,
}

impl<V> TreeNode<V> {
    pub(crate) fn new(value: i64, tag: V) -> Self {
        Self {
            value,
            tag,
            left: None,
            right: None,
            parent: None,
            owner: None,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Option<Index> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<Index> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Binary tree whose nodes all carry the same variant tag `V`.
#[derive(Debug)]
pub struct BinaryTree<V: Variant> {
    pub(crate) id: Uuid,
    pub(crate) arena: Arena<TreeNode<V>>,
    pub(crate) root: Option<Index>,
}

/// Tree of base (uncolored) nodes.
pub type PlainTree = BinaryTree<Plain>;

/// Tree of red-black color-tagged nodes.
pub type RedBlackTree = BinaryTree<Color>;

impl<V: Variant> Default for BinaryTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Variant> BinaryTree<V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            arena: Arena::new(),
            root: None,
        }
    }

    /// Creates a tree holding a single root node.
    pub fn with_root(value: i64, tag: V) -> Self {
        let mut tree = Self::new();
        let idx = tree.arena.insert(TreeNode::new(value, tag));
        tree.root = Some(idx);
        tree
    }

    pub(crate) fn handle(&self, index: Index) -> NodeId {
        NodeId {
            tree: self.id,
            index,
        }
    }

    pub(crate) fn resolve(&self, id: NodeId) -> Result<Index, StructuralError> {
        if id.tree != self.id {
            return Err(StructuralError::ForeignNode);
        }
        if !self.arena.contains(id.index) {
            return Err(StructuralError::StaleNode);
        }
        Ok(id.index)
    }

    pub(crate) fn node_at(&self, index: Index) -> Result<&TreeNode<V>, StructuralError> {
        self.arena.get(index).ok_or(StructuralError::StaleNode)
    }

    pub(crate) fn node_at_mut(&mut self, index: Index) -> Result<&mut TreeNode<V>, StructuralError> {
        self.arena.get_mut(index).ok_or(StructuralError::StaleNode)
    }

    pub(crate) fn node_ref(&self, index: Index) -> Option<NodeRef<'_, V>> {
        self.arena.get(index).map(|node| NodeRef {
            tree: self,
            index,
            node,
        })
    }

    /// Adds a detached node; attach it with [`set_left`](Self::set_left),
    /// [`set_right`](Self::set_right) or [`set_root`](Self::set_root).
    #[instrument(level = "trace", skip(self))]
    pub fn add_node(&mut self, value: i64, tag: V) -> NodeId {
        let index = self.arena.insert(TreeNode::new(value, tag));
        self.handle(index)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.map(|idx| self.handle(idx))
    }

    pub fn root_ref(&self) -> Option<NodeRef<'_, V>> {
        self.root.and_then(|idx| self.node_ref(idx))
    }

    /// Replaces the root. The new root must not be owned by another node.
    #[instrument(level = "debug", skip(self))]
    pub fn set_root(&mut self, node: Option<NodeId>) -> DomainResult<()> {
        let index = match node {
            None => None,
            Some(id) => {
                let idx = self.resolve(id)?;
                if self.node_at(idx)?.owner.is_some() {
                    return Err(StructuralError::AlreadyAttached.into());
                }
                Some(idx)
            }
        };
        self.root = index;
        Ok(())
    }

    /// Read-only view of a node.
    pub fn get(&self, id: NodeId) -> DomainResult<NodeRef<'_, V>> {
        let idx = self.resolve(id)?;
        Ok(self.node_ref(idx).ok_or(StructuralError::StaleNode)?)
    }

    pub fn value(&self, id: NodeId) -> DomainResult<i64> {
        Ok(self.get(id)?.value())
    }

    pub fn set_value(&mut self, id: NodeId, value: i64) -> DomainResult<()> {
        let idx = self.resolve(id)?;
        self.node_at_mut(idx)?.value = value;
        Ok(())
    }

    pub fn tag(&self, id: NodeId) -> DomainResult<&V> {
        let idx = self.resolve(id)?;
        Ok(&self.node_at(idx)?.tag)
    }

    pub fn set_tag(&mut self, id: NodeId, tag: V) -> DomainResult<()> {
        let idx = self.resolve(id)?;
        self.node_at_mut(idx)?.tag = tag;
        Ok(())
    }

    pub fn left(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        self.child(id, Side::Left)
    }

    pub fn right(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        self.child(id, Side::Right)
    }

    pub fn child(&self, id: NodeId, side: Side) -> DomainResult<Option<NodeId>> {
        let idx = self.resolve(id)?;
        Ok(self.node_at(idx)?.child(side).map(|c| self.handle(c)))
    }

    pub fn parent(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        let idx = self.resolve(id)?;
        Ok(self.node_at(idx)?.parent.map(|p| self.handle(p)))
    }

    pub fn set_left(&mut self, id: NodeId, child: Option<NodeId>) -> DomainResult<()> {
        self.set_child(id, Side::Left, child)
    }

    pub fn set_right(&mut self, id: NodeId, child: Option<NodeId>) -> DomainResult<()> {
        self.set_child(id, Side::Right, child)
    }

    /// Puts `child` into the given slot of `id`.
    ///
    /// The previous occupant is detached but stays in the tree, so its handle
    /// remains usable. The child's `parent` link is left untouched. Detached
    /// nodes keep their arena slots until [`remove_subtree`](Self::remove_subtree)
    /// or [`prune`](Self::prune) frees them.
    #[instrument(level = "debug", skip(self))]
    pub fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) -> DomainResult<()> {
        let idx = self.resolve(id)?;
        let current = self.node_at(idx)?.child(side);

        let incoming = match child {
            None => None,
            Some(c) => {
                let cidx = self.resolve(c)?;
                if current == Some(cidx) {
                    return Ok(());
                }
                if self.is_ancestor_or_self(cidx, idx)? {
                    return Err(StructuralError::Cycle.into());
                }
                if self.node_at(cidx)?.owner.is_some() || self.root == Some(cidx) {
                    return Err(StructuralError::AlreadyAttached.into());
                }
                Some(cidx)
            }
        };

        if let Some(prev) = current {
            debug!(?side, "detaching previous child");
            self.node_at_mut(prev)?.owner = None;
        }
        if let Some(cidx) = incoming {
            self.node_at_mut(cidx)?.owner = Some(idx);
        }
        *self.node_at_mut(idx)?.child_mut(side) = incoming;
        Ok(())
    }

    /// Sets the caller-managed back-reference of `id`.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> DomainResult<()> {
        let idx = self.resolve(id)?;
        let parent = parent.map(|p| self.resolve(p)).transpose()?;
        self.node_at_mut(idx)?.parent = parent;
        Ok(())
    }

    /// Creates a node, attaches it under `parent` and points its back-reference
    /// at `parent`. An existing child in that slot is detached.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        side: Side,
        value: i64,
        tag: V,
    ) -> DomainResult<NodeId> {
        let pidx = self.resolve(parent)?;
        let child = self.add_node(value, tag);
        self.set_child(parent, side, Some(child))?;
        self.node_at_mut(child.index)?.parent = Some(pidx);
        Ok(child)
    }

    /// Frees a detached node and everything below it, returning the number of
    /// nodes removed. Their handles become stale and `parent` links pointing
    /// at them are cleared.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, id: NodeId) -> DomainResult<usize> {
        let idx = self.resolve(id)?;
        if self.node_at(idx)?.owner.is_some() || self.root == Some(idx) {
            return Err(StructuralError::AlreadyAttached.into());
        }
        Ok(self.release(vec![idx]))
    }

    /// Frees every node not reachable from the root, returning how many were
    /// removed.
    #[instrument(level = "debug", skip(self))]
    pub fn prune(&mut self) -> usize {
        let reachable: HashSet<Index> = self.iter_preorder().map(|node| node.index).collect();
        let unreachable: Vec<Index> = self
            .arena
            .iter()
            .map(|(idx, _)| idx)
            .filter(|idx| !reachable.contains(idx))
            .collect();
        self.release(unreachable)
    }

    fn release(&mut self, start: Vec<Index>) -> usize {
        let mut removed = HashSet::new();
        let mut stack = start;
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.remove(idx) {
                stack.extend(node.left);
                stack.extend(node.right);
                removed.insert(idx);
            }
        }
        for (_, node) in self.arena.iter_mut() {
            if node.parent.is_some_and(|p| removed.contains(&p)) {
                node.parent = None;
            }
        }
        debug!(removed = removed.len(), "released nodes");
        removed.len()
    }

    /// True when `candidate` is `node` or structurally above it.
    fn is_ancestor_or_self(&self, candidate: Index, node: Index) -> Result<bool, StructuralError> {
        let mut cursor = Some(node);
        while let Some(idx) = cursor {
            if idx == candidate {
                return Ok(true);
            }
            cursor = self.node_at(idx)?.owner;
        }
        Ok(false)
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.iter_preorder().count()
    }

    /// Number of nodes held by the tree, detached ones included.
    pub fn allocated(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl RedBlackTree {
    pub fn color(&self, id: NodeId) -> DomainResult<Color> {
        self.tag(id).copied()
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) -> DomainResult<()> {
        self.set_tag(id, color)
    }
}

/// Borrowed view of a live node.
pub struct NodeRef<'a, V: Variant> {
    pub(crate) tree: &'a BinaryTree<V>,
    pub(crate) index: Index,
    pub(crate) node: &'a TreeNode<V>,
}

impl<V: Variant> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: Variant> Copy for NodeRef<'_, V> {}

impl<'a, V: Variant> NodeRef<'a, V> {
    pub fn id(&self) -> NodeId {
        self.tree.handle(self.index)
    }

    pub fn value(&self) -> i64 {
        self.node.value
    }

    pub fn tag(&self) -> &'a V {
        &self.node.tag
    }

    pub fn left(&self) -> Option<NodeRef<'a, V>> {
        self.child(Side::Left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, V>> {
        self.child(Side::Right)
    }

    pub fn child(&self, side: Side) -> Option<NodeRef<'a, V>> {
        self.node.child(side).and_then(|idx| self.tree.node_ref(idx))
    }

    pub fn parent(&self) -> Option<NodeRef<'a, V>> {
        self.node.parent.and_then(|idx| self.tree.node_ref(idx))
    }

    pub fn is_leaf(&self) -> bool {
        self.node.left.is_none() && self.node.right.is_none()
    }
}

impl<'a> NodeRef<'a, Color> {
    pub fn color(&self) -> Color {
        self.node.tag
    }
}

/// Shallow equality: value and variant tag, children ignored.
impl<'b, V: Variant> PartialEq<NodeRef<'b, V>> for NodeRef<'_, V> {
    fn eq(&self, other: &NodeRef<'b, V>) -> bool {
        self.node.value == other.node.value && self.node.tag == other.node.tag
    }
}

impl<V: Variant> fmt::Debug for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.tag.annotation() {
            Some(note) => write!(f, "{:?}Node[{}, {}]", V::KIND, self.node.value, note),
            None => write!(f, "{:?}Node[{}]", V::KIND, self.node.value),
        }
    }
}

impl<V: Variant> fmt::Display for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.tag.annotation() {
            Some(note) => write!(f, "{} ({})", self.node.value, note),
            None => write!(f, "{}", self.node.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_chain_blocks_cycles() {
        let mut tree = PlainTree::with_root(1, Plain);
        let root = tree.root().unwrap();
        let child = tree.insert_child(root, Side::Left, 2, Plain).unwrap();
        let grandchild = tree.insert_child(child, Side::Right, 3, Plain).unwrap();

        assert!(tree.is_ancestor_or_self(root.index, grandchild.index).unwrap());
        assert!(!tree.is_ancestor_or_self(grandchild.index, root.index).unwrap());
    }

    #[test]
    fn test_detached_child_keeps_valid_handle() {
        let mut tree = PlainTree::with_root(1, Plain);
        let root = tree.root().unwrap();
        let old = tree.insert_child(root, Side::Left, 2, Plain).unwrap();
        let _new = tree.insert_child(root, Side::Left, 5, Plain).unwrap();

        assert_eq!(tree.value(old).unwrap(), 2);
        assert!(tree.node_at(old.index).unwrap().owner.is_none());
        assert_eq!(tree.len(), 2);
    }
}
