//! Tests for traversal orders and equality

use std::collections::HashSet;

use rstest::rstest;
use treediag::domain::{Color, NodeId, Order, Plain, PlainTree, RedBlackTree, Side};

/// ```text
///        4
///      /   \
///     2     6
///    / \   /
///   1   3 5
/// ```
fn sample() -> PlainTree {
    let mut tree = PlainTree::with_root(4, Plain);
    let root = tree.root().unwrap();
    let two = tree.insert_child(root, Side::Left, 2, Plain).unwrap();
    let six = tree.insert_child(root, Side::Right, 6, Plain).unwrap();
    tree.insert_child(two, Side::Left, 1, Plain).unwrap();
    tree.insert_child(two, Side::Right, 3, Plain).unwrap();
    tree.insert_child(six, Side::Left, 5, Plain).unwrap();
    tree
}

#[rstest]
#[case(Order::Pre, vec![4, 2, 1, 3, 6, 5])]
#[case(Order::In, vec![1, 2, 3, 4, 5, 6])]
#[case(Order::Post, vec![1, 3, 2, 5, 6, 4])]
fn given_sample_tree_when_traversed_then_visits_in_order(
    #[case] order: Order,
    #[case] expected: Vec<i64>,
) {
    // Arrange
    let tree = sample();

    // Act
    let values = tree.values(order);

    // Assert
    assert_eq!(values, expected);
}

#[test]
fn given_any_tree_when_traversed_then_each_order_is_permutation_of_nodes() {
    // Arrange
    let tree = sample();

    // Act
    let sets: Vec<HashSet<NodeId>> = [Order::Pre, Order::In, Order::Post]
        .into_iter()
        .map(|order| tree.traverse(order).iter().map(|n| n.id()).collect())
        .collect();

    // Assert
    for set in &sets {
        assert_eq!(set.len(), tree.len());
        assert_eq!(set, &sets[0]);
    }
}

#[test]
fn given_empty_tree_when_traversed_then_empty() {
    let tree = RedBlackTree::new();

    assert!(tree.preorder().is_empty());
    assert!(tree.inorder().is_empty());
    assert!(tree.postorder().is_empty());
}

#[test]
fn given_subtree_when_traversed_from_node_then_covers_only_subtree() {
    // Arrange
    let tree = sample();
    let two = tree.root_ref().unwrap().left().unwrap();

    // Act
    let values: Vec<i64> = two.inorder().iter().map(|n| n.value()).collect();

    // Assert
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn given_degenerate_chain_when_traversed_then_does_not_overflow_stack() {
    // Arrange: a right-leaning chain far deeper than the decoder would accept
    let mut tree = PlainTree::with_root(0, Plain);
    let mut cursor = tree.root().unwrap();
    for value in 1..5_000 {
        cursor = tree.insert_child(cursor, Side::Right, value, Plain).unwrap();
    }

    // Act
    let post = tree.postorder();
    let copy = tree.deep_copy();

    // Assert
    assert_eq!(post.len(), 5_000);
    assert_eq!(tree.height(), 5_000);
    assert!(tree.is_equal_including_subtrees(&copy));
}

// ============================================================
// Deep equality
// ============================================================

#[test]
fn given_identical_structure_when_compared_then_deep_equal() {
    let a = sample();
    let b = sample();

    assert!(a.is_equal_including_subtrees(&b));
    assert!(a.root_ref().unwrap() == b.root_ref().unwrap());
}

#[test]
fn given_differing_leaf_when_compared_then_shallow_equal_but_not_deep() {
    // Arrange
    let a = sample();
    let mut b = sample();
    let five = b
        .iter_preorder()
        .find(|n| n.value() == 5)
        .map(|n| n.id())
        .unwrap();
    b.set_value(five, 50).unwrap();

    // Act / Assert
    assert!(a.root_ref().unwrap() == b.root_ref().unwrap());
    assert!(!a.is_equal_including_subtrees(&b));
}

#[test]
fn given_missing_child_on_one_side_when_compared_then_not_equal() {
    let a = sample();
    let mut b = sample();
    let six = b.root_ref().unwrap().right().unwrap().id();
    b.set_left(six, None).unwrap();

    assert!(!a.is_equal_including_subtrees(&b));
    assert!(!b.is_equal_including_subtrees(&a));
}

#[test]
fn given_same_values_different_colors_when_compared_then_not_equal() {
    let a = RedBlackTree::with_root(1, Color::Red);
    let b = RedBlackTree::with_root(1, Color::Black);

    assert!(!a.is_equal_including_subtrees(&b));
}

#[test]
fn given_two_empty_trees_when_compared_then_equal() {
    assert!(PlainTree::new().is_equal_including_subtrees(&PlainTree::new()));
    assert!(!PlainTree::new().is_equal_including_subtrees(&sample()));
}

#[rstest]
#[case("pre", Order::Pre)]
#[case("inorder", Order::In)]
#[case("post", Order::Post)]
fn given_order_name_when_parsed_then_matches(#[case] raw: &str, #[case] expected: Order) {
    assert_eq!(raw.parse::<Order>().unwrap(), expected);
}
