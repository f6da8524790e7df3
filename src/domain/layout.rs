//! Diagram layout: turns a tree into a graph description for Graphviz.
//!
//! Automatic layout places the leaves of a short branch much closer to the
//! root than those of a deep branch. To keep every branch equally deep the
//! builder pads the tree up to its *padded height*:
//!
//! * a **real** node is emitted for every tree node, followed by its left
//!   child, a middle filler and its right child;
//! * a **sentinel** (`NIL`) stands in for an absent child, visible or not,
//!   and carries three fillers below it;
//! * a **filler** is an invisible spacer whose heavy edge keeps it stacked
//!   straight down; below a filler only further fillers are emitted.
//!
//! Identifiers are the parent identifier followed by a direction marker and
//! the node's own label, so equal values in sibling subtrees never collide.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use crate::domain::codec::DEFAULT_MAX_DEPTH;
use crate::domain::error::{DomainResult, ValidationError};
use crate::domain::node::{BinaryTree, NodeRef};
use crate::domain::variant::Variant;

pub const SENTINEL_LABEL: &str = "NIL";
pub const FILLER_LABEL: &str = "FILLER";

/// Edge weight of structural edges and sentinel edges.
pub const STRUCTURAL_WEIGHT: u32 = 0;
/// Edge weight of filler edges.
pub const FILLER_WEIGHT: u32 = 1000;

/// Default bound on emitted layout nodes. A chain of about 70 nodes already
/// pads out to this many.
pub const DEFAULT_MAX_NODES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Real,
    Sentinel,
    Filler,
}

/// Position of a layout node below its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Middle,
    Right,
}

impl Direction {
    pub fn marker(&self) -> char {
        match self {
            Direction::Left => '<',
            Direction::Middle => '_',
            Direction::Right => '>',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    #[serde(skip)]
    pub id: String,
    pub label: String,
    pub kind: LayoutKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    pub visible: bool,
    /// Emission depth, 0 for the root
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
    pub weight: u32,
    pub visible: bool,
}

/// Graph description handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutGraph {
    title: Option<String>,
    height: usize,
    nodes: Vec<LayoutNode>,
    edges: Vec<LayoutEdge>,
    positions: HashMap<String, usize>,
}

impl LayoutGraph {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Padded height the diagram was built for.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Nodes in emission order.
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.positions.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a LayoutNode> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.from == id)
            .filter_map(|e| self.node(&e.to))
    }

    /// Nodes without emitted children.
    pub fn leaves(&self) -> Vec<&LayoutNode> {
        let parents: HashSet<&str> = self.edges.iter().map(|e| e.from.as_str()).collect();
        self.nodes
            .iter()
            .filter(|n| !parents.contains(n.id.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push_node(&mut self, node: LayoutNode) {
        self.positions.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    fn push_edge(&mut self, from: &str, to: &str, weight: u32, visible: bool) {
        self.edges.push(LayoutEdge {
            from: from.to_string(),
            to: to.to_string(),
            weight,
            visible,
        });
    }
}

struct NodeMap<'a>(&'a [LayoutNode]);

impl Serialize for NodeMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for node in self.0 {
            map.serialize_entry(&node.id, node)?;
        }
        map.end()
    }
}

impl Serialize for LayoutGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LayoutGraph", 4)?;
        if let Some(title) = &self.title {
            state.serialize_field("title", title)?;
        } else {
            state.skip_field("title")?;
        }
        state.serialize_field("height", &self.height)?;
        state.serialize_field("nodes", &NodeMap(&self.nodes))?;
        state.serialize_field("edges", &self.edges)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Draw absent children as visible `NIL` markers; `None` uses the variant default
    pub show_sentinels: Option<bool>,
    pub title: Option<String>,
    /// Largest padded height accepted
    pub max_depth: usize,
    /// Most layout nodes (real, sentinel and filler) a diagram may contain
    pub max_nodes: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            show_sentinels: None,
            title: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl LayoutOptions {
    pub fn with_sentinels(mut self, show: bool) -> Self {
        self.show_sentinels = Some(show);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Levels the diagram must reach below `root`. An absent child counts as
/// one level when sentinels are shown and as none otherwise.
pub fn padded_height<V: Variant>(root: Option<NodeRef<'_, V>>, show_sentinels: bool) -> usize {
    let Some(root) = root else {
        return 0;
    };
    let absent = usize::from(show_sentinels);
    let mut heights: HashMap<Index, usize> = HashMap::new();
    for node in root.iter_postorder() {
        let left = node
            .node
            .left
            .and_then(|i| heights.get(&i).copied())
            .unwrap_or(absent);
        let right = node
            .node
            .right
            .and_then(|i| heights.get(&i).copied())
            .unwrap_or(absent);
        heights.insert(node.index, left.max(right) + 1);
    }
    heights.get(&root.index).copied().unwrap_or(0)
}

/// Number of layout nodes [`build_layout`] emits for `root`, computed from
/// the padded height without building the graph. Saturates on overflow.
pub fn layout_node_count<V: Variant>(
    root: Option<NodeRef<'_, V>>,
    show_sentinels: bool,
) -> usize {
    count_layout_nodes(root, padded_height(root, show_sentinels))
}

fn count_layout_nodes<V: Variant>(root: Option<NodeRef<'_, V>>, height: usize) -> usize {
    // a filler at `depth` continues straight down to the last level
    let filler = |depth: usize| height.saturating_sub(depth);
    let sentinel = |depth: usize| {
        if depth < height {
            filler(depth + 1).saturating_mul(3).saturating_add(1)
        } else {
            0
        }
    };

    let mut total = 0usize;
    let mut stack: Vec<(NodeRef<'_, V>, usize)> =
        root.map(|node| (node, 0)).into_iter().collect();
    while let Some((node, depth)) = stack.pop() {
        total = total.saturating_add(1 + filler(depth + 1));
        for child in [node.left(), node.right()] {
            match child {
                Some(child) => stack.push((child, depth + 1)),
                None => total = total.saturating_add(sentinel(depth + 1)),
            }
        }
    }
    total
}

enum Slot<'a, V: Variant> {
    Real(NodeRef<'a, V>),
    Sentinel,
    Filler,
}

impl<'a, V: Variant> Slot<'a, V> {
    fn from_child(child: Option<NodeRef<'a, V>>) -> Self {
        child.map(Slot::Real).unwrap_or(Slot::Sentinel)
    }
}

struct Pending<'a, V: Variant> {
    slot: Slot<'a, V>,
    parent: Option<String>,
    direction: Direction,
    depth: usize,
}

fn compose_id(parent: Option<&str>, direction: Direction, label: &str) -> String {
    let parent = parent.unwrap_or_default();
    let mut id = String::with_capacity(parent.len() + label.len() + 1);
    id.push_str(parent);
    id.push(direction.marker());
    id.push_str(label);
    id
}

/// Builds the padded graph description for the tree under `root`.
///
/// Emission order equals a recursive pre-order walk (node, then its left,
/// middle and right slots); an explicit stack keeps deep trees off the call
/// stack.
#[instrument(level = "debug", skip(root))]
pub fn build_layout<V: Variant>(
    root: Option<NodeRef<'_, V>>,
    options: &LayoutOptions,
) -> DomainResult<LayoutGraph> {
    let show = options.show_sentinels.unwrap_or(V::SHOW_SENTINELS);
    let height = padded_height(root, show);
    if height > options.max_depth {
        return Err(ValidationError::TooDeep {
            limit: options.max_depth,
        }
        .into());
    }
    let expected = count_layout_nodes(root, height);
    if expected > options.max_nodes {
        return Err(ValidationError::LayoutTooLarge {
            nodes: expected,
            limit: options.max_nodes,
        }
        .into());
    }

    let mut graph = LayoutGraph {
        title: options.title.clone(),
        height,
        ..LayoutGraph::default()
    };
    let mut stack: Vec<Pending<'_, V>> = root
        .into_iter()
        .map(|node| Pending {
            slot: Slot::Real(node),
            parent: None,
            direction: Direction::Middle,
            depth: 0,
        })
        .collect();

    while let Some(pending) = stack.pop() {
        if pending.depth >= height {
            continue;
        }
        let parent = pending.parent.as_deref();
        let depth = pending.depth;

        let (id, children) = match pending.slot {
            Slot::Real(node) => {
                let label = node.value().to_string();
                let id = compose_id(parent, pending.direction, &label);
                graph.push_node(LayoutNode {
                    id: id.clone(),
                    label,
                    kind: LayoutKind::Real,
                    fill_color: node.tag().fill_color().map(str::to_string),
                    visible: true,
                    depth,
                });
                if let Some(parent) = parent {
                    graph.push_edge(parent, &id, STRUCTURAL_WEIGHT, true);
                }
                let children = vec![
                    (Slot::from_child(node.left()), Direction::Left),
                    (Slot::Filler, Direction::Middle),
                    (Slot::from_child(node.right()), Direction::Right),
                ];
                (id, children)
            }
            Slot::Sentinel => {
                let id = compose_id(parent, pending.direction, SENTINEL_LABEL);
                graph.push_node(LayoutNode {
                    id: id.clone(),
                    label: SENTINEL_LABEL.to_string(),
                    kind: LayoutKind::Sentinel,
                    fill_color: None,
                    visible: show,
                    depth,
                });
                if let Some(parent) = parent {
                    graph.push_edge(parent, &id, STRUCTURAL_WEIGHT, show);
                }
                let children = vec![
                    (Slot::Filler, Direction::Left),
                    (Slot::Filler, Direction::Middle),
                    (Slot::Filler, Direction::Right),
                ];
                (id, children)
            }
            Slot::Filler => {
                let id = compose_id(parent, pending.direction, FILLER_LABEL);
                graph.push_node(LayoutNode {
                    id: id.clone(),
                    label: String::new(),
                    kind: LayoutKind::Filler,
                    fill_color: None,
                    visible: false,
                    depth,
                });
                if let Some(parent) = parent {
                    graph.push_edge(parent, &id, FILLER_WEIGHT, false);
                }
                (id, vec![(Slot::Filler, Direction::Middle)])
            }
        };

        // reversed so the left slot is emitted first
        for (slot, direction) in children.into_iter().rev() {
            stack.push(Pending {
                slot,
                parent: Some(id.clone()),
                direction,
                depth: depth + 1,
            });
        }
    }

    debug!(
        height,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "layout built"
    );
    Ok(graph)
}

impl<V: Variant> BinaryTree<V> {
    /// Graph description of the whole tree; see [`build_layout`].
    pub fn layout(&self, options: &LayoutOptions) -> DomainResult<LayoutGraph> {
        build_layout(self.root_ref(), options)
    }

    pub fn padded_height(&self, show_sentinels: bool) -> usize {
        padded_height(self.root_ref(), show_sentinels)
    }
}
