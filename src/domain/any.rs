//! Trees whose variant is only known at runtime, e.g. decoded from
//! untrusted input. Variant rules the type system cannot see here are
//! checked explicitly and reported as typed errors.

use serde_json::Value;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::codec::DecodeOptions;
use crate::domain::color::Color;
use crate::domain::display::TreeNodeConvert;
use crate::domain::error::{DomainResult, StructuralError};
use crate::domain::layout::{LayoutGraph, LayoutOptions};
use crate::domain::node::{NodeId, PlainTree, RedBlackTree, Side};
use crate::domain::traversal::Order;
use crate::domain::variant::{VariantKind, COLOR_KEY};

#[derive(Debug)]
pub enum AnyTree {
    Plain(PlainTree),
    Colored(RedBlackTree),
}

impl From<PlainTree> for AnyTree {
    fn from(tree: PlainTree) -> Self {
        AnyTree::Plain(tree)
    }
}

impl From<RedBlackTree> for AnyTree {
    fn from(tree: RedBlackTree) -> Self {
        AnyTree::Colored(tree)
    }
}

/// Variant a record declares through its root: a `color` key means red-black.
pub fn detect_variant(value: &Value) -> VariantKind {
    match value {
        Value::Object(record) if record.contains_key(COLOR_KEY) => VariantKind::Colored,
        _ => VariantKind::Plain,
    }
}

impl AnyTree {
    pub fn kind(&self) -> VariantKind {
        match self {
            AnyTree::Plain(_) => VariantKind::Plain,
            AnyTree::Colored(_) => VariantKind::Colored,
        }
    }

    /// Decodes a record, taking the variant from the root record.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        Self::from_value_as(value, None, DecodeOptions::default())
    }

    /// Decodes a record as `kind`, or as the detected variant when `kind` is
    /// `None`. Nodes that disagree with the variant fail validation.
    #[instrument(level = "debug", skip(value))]
    pub fn from_value_as(
        value: &Value,
        kind: Option<VariantKind>,
        options: DecodeOptions,
    ) -> DomainResult<Self> {
        let kind = kind.unwrap_or_else(|| detect_variant(value));
        debug!(%kind, "decoding tree");
        Ok(match kind {
            VariantKind::Plain => AnyTree::Plain(PlainTree::from_value_with(value, options)?),
            VariantKind::Colored => {
                AnyTree::Colored(RedBlackTree::from_value_with(value, options)?)
            }
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            AnyTree::Plain(t) => t.to_value(),
            AnyTree::Colored(t) => t.to_value(),
        }
    }

    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_value())
    }

    pub fn as_plain(&self) -> Option<&PlainTree> {
        match self {
            AnyTree::Plain(t) => Some(t),
            AnyTree::Colored(_) => None,
        }
    }

    pub fn as_colored(&self) -> Option<&RedBlackTree> {
        match self {
            AnyTree::Colored(t) => Some(t),
            AnyTree::Plain(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyTree::Plain(t) => t.len(),
            AnyTree::Colored(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnyTree::Plain(t) => t.is_empty(),
            AnyTree::Colored(t) => t.is_empty(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            AnyTree::Plain(t) => t.height(),
            AnyTree::Colored(t) => t.height(),
        }
    }

    pub fn values(&self, order: Order) -> Vec<i64> {
        match self {
            AnyTree::Plain(t) => t.values(order),
            AnyTree::Colored(t) => t.values(order),
        }
    }

    /// Shallow equality of the roots; trees of different variants are never equal.
    pub fn roots_equal(&self, other: &AnyTree) -> bool {
        match (self, other) {
            (AnyTree::Plain(a), AnyTree::Plain(b)) => a.root_ref() == b.root_ref(),
            (AnyTree::Colored(a), AnyTree::Colored(b)) => a.root_ref() == b.root_ref(),
            _ => false,
        }
    }

    /// Deep equality; trees of different variants are never equal.
    pub fn is_equal_including_subtrees(&self, other: &AnyTree) -> bool {
        match (self, other) {
            (AnyTree::Plain(a), AnyTree::Plain(b)) => a.is_equal_including_subtrees(b),
            (AnyTree::Colored(a), AnyTree::Colored(b)) => a.is_equal_including_subtrees(b),
            _ => false,
        }
    }

    /// Moves `subtree` under `at`, provided both trees share a variant.
    pub fn graft(&mut self, at: NodeId, side: Side, subtree: AnyTree) -> DomainResult<Option<NodeId>> {
        match (self, subtree) {
            (AnyTree::Plain(t), AnyTree::Plain(s)) => t.graft(at, side, s),
            (AnyTree::Colored(t), AnyTree::Colored(s)) => t.graft(at, side, s),
            (this, other) => Err(StructuralError::VariantMismatch {
                expected: this.kind().name(),
                found: other.kind().name(),
            }
            .into()),
        }
    }

    /// Red-black copy with every node set to `color`.
    pub fn colorize(&self, color: Color) -> RedBlackTree {
        match self {
            AnyTree::Plain(t) => t.colorize(color),
            AnyTree::Colored(t) => t.map_tags(|_| color),
        }
    }

    pub fn layout(&self, options: &LayoutOptions) -> DomainResult<LayoutGraph> {
        match self {
            AnyTree::Plain(t) => t.layout(options),
            AnyTree::Colored(t) => t.layout(options),
        }
    }

    pub fn to_text_tree(&self) -> Tree<String> {
        match self {
            AnyTree::Plain(t) => t.to_text_tree(),
            AnyTree::Colored(t) => t.to_text_tree(),
        }
    }
}
