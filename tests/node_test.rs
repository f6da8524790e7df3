//! Tests for the node model: construction, handles and ownership rules

use treediag::domain::{
    Color, DomainError, Plain, PlainTree, RedBlackTree, Side, StructuralError,
};

fn structural(err: DomainError) -> StructuralError {
    match err {
        DomainError::Structural(e) => e,
        other => panic!("expected structural error, got {other:?}"),
    }
}

// ============================================================
// Construction and accessors
// ============================================================

#[test]
fn given_new_tree_when_inspected_then_empty() {
    // Arrange / Act
    let tree = PlainTree::new();

    // Assert
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert!(tree.root().is_none());
    assert_eq!(tree.height(), 0);
}

#[test]
fn given_detached_nodes_when_linked_then_children_are_reachable() {
    // Arrange
    let mut tree = PlainTree::new();
    let root = tree.add_node(2, Plain);
    let left = tree.add_node(1, Plain);
    let right = tree.add_node(3, Plain);

    // Act
    tree.set_root(Some(root)).unwrap();
    tree.set_left(root, Some(left)).unwrap();
    tree.set_right(root, Some(right)).unwrap();

    // Assert
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.left(root).unwrap(), Some(left));
    assert_eq!(tree.right(root).unwrap(), Some(right));
    assert_eq!(tree.value(right).unwrap(), 3);
}

#[test]
fn given_set_left_when_called_then_parent_link_is_untouched() {
    // Arrange
    let mut tree = PlainTree::with_root(2, Plain);
    let root = tree.root().unwrap();
    let child = tree.add_node(1, Plain);

    // Act
    tree.set_left(root, Some(child)).unwrap();

    // Assert: parent is caller-managed
    assert_eq!(tree.parent(child).unwrap(), None);

    tree.set_parent(child, Some(root)).unwrap();
    assert_eq!(tree.parent(child).unwrap(), Some(root));
    assert_eq!(tree.get(child).unwrap().parent().map(|p| p.value()), Some(2));
}

#[test]
fn given_insert_child_when_called_then_parent_link_points_back() {
    // Arrange
    let mut tree = RedBlackTree::with_root(5, Color::Black);
    let root = tree.root().unwrap();

    // Act
    let child = tree.insert_child(root, Side::Right, 8, Color::Red).unwrap();

    // Assert
    assert_eq!(tree.parent(child).unwrap(), Some(root));
    assert_eq!(tree.color(child).unwrap(), Color::Red);
    assert_eq!(tree.get(child).unwrap().color(), Color::Red);
}

#[test]
fn given_existing_node_when_setters_called_then_fields_change() {
    // Arrange
    let mut tree = RedBlackTree::with_root(5, Color::Black);
    let root = tree.root().unwrap();

    // Act
    tree.set_value(root, 7).unwrap();
    tree.set_color(root, Color::Red).unwrap();

    // Assert
    let node = tree.root_ref().unwrap();
    assert_eq!(node.value(), 7);
    assert_eq!(node.color(), Color::Red);
    assert_eq!(node.to_string(), "7 (RED)");
}

// ============================================================
// Handle validation and ownership
// ============================================================

#[test]
fn given_handle_from_other_tree_when_used_then_foreign_node() {
    // Arrange
    let mut a = PlainTree::with_root(1, Plain);
    let b = PlainTree::with_root(2, Plain);
    let foreign = b.root().unwrap();
    let root = a.root().unwrap();

    // Act
    let err = a.set_left(root, Some(foreign)).unwrap_err();

    // Assert: rejected without mutation
    assert_eq!(structural(err), StructuralError::ForeignNode);
    assert_eq!(a.left(root).unwrap(), None);
    assert!(matches!(
        a.value(foreign).map_err(structural),
        Err(StructuralError::ForeignNode)
    ));
}

#[test]
fn given_node_already_owned_when_attached_elsewhere_then_already_attached() {
    // Arrange
    let mut tree = PlainTree::with_root(2, Plain);
    let root = tree.root().unwrap();
    let left = tree.insert_child(root, Side::Left, 1, Plain).unwrap();
    let right = tree.insert_child(root, Side::Right, 3, Plain).unwrap();

    // Act
    let err = tree.set_left(right, Some(left)).unwrap_err();

    // Assert
    assert_eq!(structural(err), StructuralError::AlreadyAttached);
    assert_eq!(tree.left(right).unwrap(), None);
    assert_eq!(tree.left(root).unwrap(), Some(left));
}

#[test]
fn given_ancestor_when_attached_below_descendant_then_cycle() {
    // Arrange
    let mut tree = PlainTree::with_root(1, Plain);
    let root = tree.root().unwrap();
    let child = tree.insert_child(root, Side::Left, 2, Plain).unwrap();

    // Act
    let onto_child = tree.set_right(child, Some(root)).unwrap_err();
    let onto_self = tree.set_left(child, Some(child)).unwrap_err();

    // Assert
    assert_eq!(structural(onto_child), StructuralError::Cycle);
    assert_eq!(structural(onto_self), StructuralError::Cycle);
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_replaced_child_when_detached_then_can_be_attached_again() {
    // Arrange
    let mut tree = PlainTree::with_root(2, Plain);
    let root = tree.root().unwrap();
    let old = tree.insert_child(root, Side::Left, 1, Plain).unwrap();
    let right = tree.insert_child(root, Side::Right, 3, Plain).unwrap();

    // Act
    tree.set_left(root, None).unwrap();
    tree.set_left(right, Some(old)).unwrap();

    // Assert
    assert_eq!(tree.values(treediag::domain::Order::In), vec![2, 1, 3]);
}

#[test]
fn given_owned_node_when_made_root_then_already_attached() {
    // Arrange
    let mut tree = PlainTree::with_root(2, Plain);
    let root = tree.root().unwrap();
    let child = tree.insert_child(root, Side::Left, 1, Plain).unwrap();

    // Act
    let err = tree.set_root(Some(child)).unwrap_err();

    // Assert
    assert_eq!(structural(err), StructuralError::AlreadyAttached);
    assert_eq!(tree.root(), Some(root));
}

#[test]
fn given_repeated_replacement_when_detached_subtree_removed_then_arena_shrinks() {
    // Arrange: replace the left child of a root ten times
    let mut tree = PlainTree::with_root(10, Plain);
    let root = tree.root().unwrap();
    let mut replaced = Vec::new();
    for value in 0..10 {
        if let Some(previous) = tree.left(root).unwrap() {
            replaced.push(previous);
        }
        let child = tree.insert_child(root, Side::Left, value, Plain).unwrap();
        tree.insert_child(child, Side::Right, value + 100, Plain).unwrap();
    }
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.allocated(), 21);

    // Act
    let removed = tree.remove_subtree(replaced[0]).unwrap();

    // Assert
    assert_eq!(removed, 2);
    assert_eq!(tree.allocated(), 19);
    assert_eq!(
        structural(tree.value(replaced[0]).unwrap_err()),
        StructuralError::StaleNode
    );
}

#[test]
fn given_attached_node_when_removed_then_already_attached_and_nothing_freed() {
    let mut tree = PlainTree::with_root(1, Plain);
    let root = tree.root().unwrap();
    let child = tree.insert_child(root, Side::Left, 0, Plain).unwrap();

    let child_err = tree.remove_subtree(child).unwrap_err();
    let root_err = tree.remove_subtree(root).unwrap_err();

    assert_eq!(structural(child_err), StructuralError::AlreadyAttached);
    assert_eq!(structural(root_err), StructuralError::AlreadyAttached);
    assert_eq!(tree.allocated(), 2);
}

#[test]
fn given_detached_nodes_when_pruned_then_only_reachable_nodes_remain() {
    // Arrange
    let mut tree = PlainTree::with_root(5, Plain);
    let root = tree.root().unwrap();
    let old = tree.insert_child(root, Side::Left, 3, Plain).unwrap();
    tree.insert_child(old, Side::Left, 1, Plain).unwrap();
    let new = tree.insert_child(root, Side::Left, 4, Plain).unwrap();
    let stray = tree.add_node(9, Plain);
    tree.set_parent(new, Some(old)).unwrap();

    // Act
    let removed = tree.prune();

    // Assert
    assert_eq!(removed, 3);
    assert_eq!(tree.allocated(), 2);
    assert_eq!(tree.len(), 2);
    assert!(tree.value(stray).is_err());
    assert_eq!(tree.parent(new).unwrap(), None);
}

// ============================================================
// Shallow equality
// ============================================================

#[test]
fn given_same_value_and_color_when_compared_then_shallow_equal() {
    // Arrange
    let mut a = RedBlackTree::with_root(5, Color::Black);
    let ra = a.root().unwrap();
    a.insert_child(ra, Side::Left, 1, Color::Red).unwrap();
    let b = RedBlackTree::with_root(5, Color::Black);
    let c = RedBlackTree::with_root(5, Color::Red);

    // Act / Assert: children are ignored
    assert!(a.root_ref().unwrap() == b.root_ref().unwrap());
    assert!(a.root_ref().unwrap() != c.root_ref().unwrap());
}

#[test]
fn given_plain_node_when_debug_formatted_then_names_variant() {
    let tree = PlainTree::with_root(4, Plain);

    let debug = format!("{:?}", tree.root_ref().unwrap());

    assert_eq!(debug, "PlainNode[4]");
}
