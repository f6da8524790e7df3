//! Depth-first traversals and subtree equality.
//!
//! All walks follow `left`/`right` only and keep their own stack, so the
//! visit order matches the textbook recursive definitions without growing
//! the call stack on degenerate trees.

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use crate::domain::node::{BinaryTree, NodeRef};
use crate::domain::variant::Variant;

/// Depth-first visit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// root, left, right
    Pre,
    /// left, root, right
    In,
    /// left, right, root
    Post,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Pre => "preorder",
            Order::In => "inorder",
            Order::Post => "postorder",
        })
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" | "preorder" => Ok(Order::Pre),
            "in" | "inorder" => Ok(Order::In),
            "post" | "postorder" => Ok(Order::Post),
            other => Err(format!("unknown traversal order: {other}")),
        }
    }
}

pub struct PreOrder<'a, V: Variant> {
    stack: Vec<NodeRef<'a, V>>,
}

impl<'a, V: Variant> PreOrder<'a, V> {
    pub(crate) fn new(start: Option<NodeRef<'a, V>>) -> Self {
        Self {
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, V: Variant> Iterator for PreOrder<'a, V> {
    type Item = NodeRef<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // right first so that left is visited first
        if let Some(right) = current.right() {
            self.stack.push(right);
        }
        if let Some(left) = current.left() {
            self.stack.push(left);
        }
        Some(current)
    }
}

pub struct InOrder<'a, V: Variant> {
    stack: Vec<NodeRef<'a, V>>,
    cursor: Option<NodeRef<'a, V>>,
}

impl<'a, V: Variant> InOrder<'a, V> {
    pub(crate) fn new(start: Option<NodeRef<'a, V>>) -> Self {
        Self {
            stack: Vec::new(),
            cursor: start,
        }
    }
}

impl<'a, V: Variant> Iterator for InOrder<'a, V> {
    type Item = NodeRef<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.cursor.take() {
            self.stack.push(node);
            self.cursor = node.left();
        }
        let current = self.stack.pop()?;
        self.cursor = current.right();
        Some(current)
    }
}

pub struct PostOrder<'a, V: Variant> {
    stack: Vec<(NodeRef<'a, V>, bool)>,
}

impl<'a, V: Variant> PostOrder<'a, V> {
    pub(crate) fn new(start: Option<NodeRef<'a, V>>) -> Self {
        Self {
            stack: start.into_iter().map(|n| (n, false)).collect(),
        }
    }
}

impl<'a, V: Variant> Iterator for PostOrder<'a, V> {
    type Item = NodeRef<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            if let Some(right) = current.right() {
                self.stack.push((right, false));
            }
            if let Some(left) = current.left() {
                self.stack.push((left, false));
            }
        }
        None
    }
}

impl<'a, V: Variant> NodeRef<'a, V> {
    pub fn iter_preorder(self) -> PreOrder<'a, V> {
        PreOrder::new(Some(self))
    }

    pub fn iter_inorder(self) -> InOrder<'a, V> {
        InOrder::new(Some(self))
    }

    pub fn iter_postorder(self) -> PostOrder<'a, V> {
        PostOrder::new(Some(self))
    }

    pub fn preorder(self) -> Vec<NodeRef<'a, V>> {
        self.iter_preorder().collect()
    }

    pub fn inorder(self) -> Vec<NodeRef<'a, V>> {
        self.iter_inorder().collect()
    }

    pub fn postorder(self) -> Vec<NodeRef<'a, V>> {
        self.iter_postorder().collect()
    }

    pub fn traverse(self, order: Order) -> Vec<NodeRef<'a, V>> {
        match order {
            Order::Pre => self.preorder(),
            Order::In => self.inorder(),
            Order::Post => self.postorder(),
        }
    }

    /// Deep equality: shallow-equal roots and pairwise equal left and right
    /// subtrees. An absent subtree only equals another absent subtree.
    pub fn is_equal_including_subtrees(&self, other: &NodeRef<'_, V>) -> bool {
        let mut pending = vec![(Some(*self), Some(*other))];
        while let Some(pair) = pending.pop() {
            match pair {
                (None, None) => continue,
                (Some(a), Some(b)) => {
                    if a != b {
                        return false;
                    }
                    pending.push((a.right(), b.right()));
                    pending.push((a.left(), b.left()));
                }
                _ => return false,
            }
        }
        true
    }

    /// Number of levels on the longest downward path from this node.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(*self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            for child in [node.left(), node.right()].into_iter().flatten() {
                stack.push((child, level + 1));
            }
        }
        deepest
    }
}

impl<V: Variant> BinaryTree<V> {
    pub fn iter_preorder(&self) -> PreOrder<'_, V> {
        PreOrder::new(self.root_ref())
    }

    pub fn iter_inorder(&self) -> InOrder<'_, V> {
        InOrder::new(self.root_ref())
    }

    pub fn iter_postorder(&self) -> PostOrder<'_, V> {
        PostOrder::new(self.root_ref())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn preorder(&self) -> Vec<NodeRef<'_, V>> {
        self.iter_preorder().collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn inorder(&self) -> Vec<NodeRef<'_, V>> {
        self.iter_inorder().collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn postorder(&self) -> Vec<NodeRef<'_, V>> {
        self.iter_postorder().collect()
    }

    pub fn traverse(&self, order: Order) -> Vec<NodeRef<'_, V>> {
        match order {
            Order::Pre => self.preorder(),
            Order::In => self.inorder(),
            Order::Post => self.postorder(),
        }
    }

    /// Node values in the given order.
    pub fn values(&self, order: Order) -> Vec<i64> {
        self.traverse(order).iter().map(|n| n.value()).collect()
    }

    /// Deep equality of the two trees; two empty trees are equal.
    #[instrument(level = "debug", skip_all)]
    pub fn is_equal_including_subtrees(&self, other: &BinaryTree<V>) -> bool {
        match (self.root_ref(), other.root_ref()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.is_equal_including_subtrees(&b),
            _ => false,
        }
    }

    /// Levels on the longest root-to-leaf path, 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.root_ref().map(|root| root.height()).unwrap_or(0)
    }
}
