//! Tests for tree edits: append, insert, remove, move and the dirty flag.

use tagsoup_dom::{Attribute, DomError, DomTree, NodeId};

/// Helper to create an element attached under `parent`.
fn attach(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let id = tree.create_element(tag);
    tree.append_child(parent, id).unwrap();
    id
}

/// Helper building `<div>` with children `a`, `b`, `c`.
fn three_children(tree: &mut DomTree) -> (NodeId, NodeId, NodeId, NodeId) {
    let parent = attach(tree, NodeId::ROOT, "div");
    let a = attach(tree, parent, "a");
    let b = attach(tree, parent, "b");
    let c = attach(tree, parent, "c");
    (parent, a, b, c)
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = attach(&mut tree, NodeId::ROOT, "div");
    let child = attach(&mut tree, parent, "p");

    tree.remove_child(parent, child).unwrap();

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    tree.remove_child(parent, b).unwrap();

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_last_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    tree.remove_child(parent, c).unwrap();

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_remove_non_child_fails() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = three_children(&mut tree);
    let stray = tree.create_element("span");

    assert_eq!(
        tree.remove_child(parent, stray),
        Err(DomError::NotAChild { parent, child: stray })
    );
    assert_eq!(
        tree.remove_child(a, parent),
        Err(DomError::NotAChild { parent: a, child: parent })
    );
}

// ========== insert_before / insert_after / prepend ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = attach(&mut tree, NodeId::ROOT, "div");
    let existing = attach(&mut tree, parent, "b");

    let new_child = tree.create_element("a");
    tree.insert_before(parent, new_child, existing).unwrap();

    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_after_middle() {
    let mut tree = DomTree::new();
    let parent = attach(&mut tree, NodeId::ROOT, "div");
    let a = attach(&mut tree, parent, "a");
    let c = attach(&mut tree, parent, "c");

    let b = tree.create_element("b");
    tree.insert_after(parent, b, a).unwrap();

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_prepend_moves_existing_child() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    tree.prepend_child(parent, c).unwrap();

    assert_eq!(tree.children(parent), &[c, a, b]);
    assert_eq!(tree.prev_sibling(c), None);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_insert_before_unrelated_reference_fails() {
    let mut tree = DomTree::new();
    let (parent, _, _, _) = three_children(&mut tree);
    let other = attach(&mut tree, NodeId::ROOT, "section");
    let new_child = tree.create_element("i");

    assert_eq!(
        tree.insert_before(parent, new_child, other),
        Err(DomError::NotAChild { parent, child: other })
    );
    assert_eq!(tree.parent(new_child), None);
}

#[test]
fn test_insert_ancestor_is_rejected() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = three_children(&mut tree);

    assert_eq!(tree.append_child(a, parent), Err(DomError::HierarchyCycle));
    assert_eq!(tree.append_child(a, a), Err(DomError::HierarchyCycle));
    assert_eq!(tree.append_child(a, NodeId::ROOT), Err(DomError::HierarchyCycle));
}

#[test]
fn test_unknown_node_is_rejected() {
    let mut tree = DomTree::new();
    assert_eq!(
        tree.append_child(NodeId::ROOT, NodeId(99)),
        Err(DomError::InvalidNode(NodeId(99)))
    );
}

// ========== parse-time construction ==========

#[test]
fn test_append_parsed_rejects_unknown_child() {
    let mut tree = DomTree::new();
    let div = attach(&mut tree, NodeId::ROOT, "div");

    assert_eq!(
        tree.append_parsed(div, NodeId(99)),
        Err(DomError::InvalidNode(NodeId(99)))
    );
    assert!(tree.children(div).is_empty());
}

#[test]
fn test_append_parsed_rejects_unknown_parent() {
    let mut tree = DomTree::new();
    let span = tree.create_element("span");

    assert_eq!(
        tree.append_parsed(NodeId(42), span),
        Err(DomError::InvalidNode(NodeId(42)))
    );
    assert_eq!(tree.parent(span), None);
}

#[test]
fn test_move_parsed_keeps_tree_clean() {
    let mut tree = DomTree::new();
    let left = tree.create_element("div");
    let right = tree.create_element("div");
    let leaf = tree.create_element("b");
    tree.append_parsed(NodeId::ROOT, left).unwrap();
    tree.append_parsed(NodeId::ROOT, right).unwrap();
    tree.append_parsed(left, leaf).unwrap();

    tree.move_parsed(leaf, right).unwrap();

    assert!(tree.children(left).is_empty());
    assert_eq!(tree.children(right), &[leaf]);
    assert!(!tree.is_dirty(NodeId::ROOT));
    assert_eq!(
        tree.move_parsed(NodeId(99), right),
        Err(DomError::InvalidNode(NodeId(99)))
    );
    assert_eq!(tree.children(right), &[leaf]);
}

#[test]
fn test_push_parsed_attribute_rejects_unknown_node() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");

    tree.push_parsed_attribute(div, Attribute::new("id", "x")).unwrap();
    assert_eq!(tree.attribute_value(div, "id"), Some("x"));
    assert_eq!(
        tree.push_parsed_attribute(NodeId(7), Attribute::new("id", "y")),
        Err(DomError::InvalidNode(NodeId(7)))
    );
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = attach(&mut tree, NodeId::ROOT, "div");
    let to = attach(&mut tree, NodeId::ROOT, "span");
    let existing = attach(&mut tree, to, "x");
    let moved = attach(&mut tree, from, "y");

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, moved]);
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
}

#[test]
fn test_move_children_empty_source() {
    let mut tree = DomTree::new();
    let from = attach(&mut tree, NodeId::ROOT, "div");
    let to = attach(&mut tree, NodeId::ROOT, "span");

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert!(tree.children(to).is_empty());
}

// ========== dirty tracking ==========

#[test]
fn test_reparenting_dirties_both_parents() {
    let mut tree = DomTree::new();
    let left = tree.create_element("div");
    let right = tree.create_element("div");
    let leaf = tree.create_element("b");
    tree.append_parsed(NodeId::ROOT, left).unwrap();
    tree.append_parsed(NodeId::ROOT, right).unwrap();
    tree.append_parsed(left, leaf).unwrap();
    assert!(!tree.is_dirty(left));

    tree.append_child(right, leaf).unwrap();

    assert!(tree.is_dirty(left));
    assert!(tree.is_dirty(right));
    assert!(tree.is_dirty(NodeId::ROOT));
    assert!(!tree.is_dirty(leaf));
}

#[test]
fn test_set_text_on_element_replaces_children() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = three_children(&mut tree);

    tree.set_text(parent, "plain").unwrap();

    assert_eq!(tree.children(parent).len(), 1);
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.inner_text(parent).unwrap(), "plain");
    assert_eq!(tree.outer_html(parent).unwrap(), "<div>plain</div>");
}

#[test]
fn test_remove_attribute_drops_duplicates() {
    let mut tree = DomTree::new();
    let div = attach(&mut tree, NodeId::ROOT, "div");
    tree.set_attribute_value(div, "class", "a").unwrap();
    tree.set_attribute_value(div, "CLASS", "b").unwrap();
    assert_eq!(tree.attribute_value(div, "class"), Some("b"));

    assert_eq!(tree.remove_attribute(div, "class").unwrap(), 1);
    assert_eq!(tree.remove_attribute(div, "class").unwrap(), 0);
    assert_eq!(tree.outer_html(div).unwrap(), "<div></div>");
}
