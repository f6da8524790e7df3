//! Domain layer: tree model and algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod any;
pub mod codec;
pub mod color;
pub mod convert;
pub mod display;
pub mod error;
pub mod layout;
pub mod node;
pub mod traversal;
pub mod variant;

pub use any::{detect_variant, AnyTree};
pub use codec::{DecodeOptions, DEFAULT_MAX_DEPTH};
pub use color::Color;
pub use display::TreeNodeConvert;
pub use error::{DomainError, DomainResult, StructuralError, ValidationError};
pub use layout::{
    build_layout, layout_node_count, padded_height, Direction, LayoutEdge, LayoutGraph,
    LayoutKind, LayoutNode, LayoutOptions, DEFAULT_MAX_NODES,
};
pub use node::{BinaryTree, NodeId, NodeRef, PlainTree, RedBlackTree, Side};
pub use traversal::Order;
pub use variant::{Plain, Variant, VariantKind};
