//! Red-black tree over nodes stored in an external arena.
//!
//! The tree itself only remembers its root. Links, colors and values live in whatever implements
//! [`RbNodes`], addressed by copyable ids. For directory entries the ids are SIDs and the links are
//! the sibling fields of the entries, so balancing the tree directly produces the sibling encoding
//! written to disk.
//!

use std::{cmp::Ordering, fmt::Debug};

use thiserror::Error;

use crate::types::Color;

/// Capabilities the tree needs from the collection holding its nodes
///
/// Setters only change the named link. The tree keeps parent links consistent itself.
pub trait RbNodes {
    /// Handle of a node
    type Id: Copy + Eq + Debug;

    /// Value the tree is ordered by
    type Node: Ord + ?Sized;

    fn node(&self, id: Self::Id) -> &Self::Node;

    fn left(&self, id: Self::Id) -> Option<Self::Id>;
    fn right(&self, id: Self::Id) -> Option<Self::Id>;
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;
    fn color(&self, id: Self::Id) -> Color;

    fn set_left(&mut self, id: Self::Id, left: Option<Self::Id>);
    fn set_right(&mut self, id: Self::Id, right: Option<Self::Id>);
    fn set_parent(&mut self, id: Self::Id, parent: Option<Self::Id>);
    fn set_color(&mut self, id: Self::Id, color: Color);

    /// Move the value of `from` into `to`, leaving the links and color of `to` alone
    fn copy_value(&mut self, from: Self::Id, to: Self::Id);

    fn grandparent(&self, id: Self::Id) -> Option<Self::Id> {
        self.parent(id).and_then(|parent| self.parent(parent))
    }

    fn sibling(&self, id: Self::Id) -> Option<Self::Id> {
        let parent = self.parent(id)?;
        if self.left(parent) == Some(id) {
            self.right(parent)
        } else {
            self.left(parent)
        }
    }

    fn uncle(&self, id: Self::Id) -> Option<Self::Id> {
        self.parent(id).and_then(|parent| self.sibling(parent))
    }
}

/// Order in which [`RbTree::visit`] reports nodes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Traversal {
    /// Node before its subtrees
    PreOrder,
    /// Left subtree, node, right subtree. Yields nodes sorted ascending.
    InOrder,
}

/// Outcome of a successful [`RbTree::delete`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Deleted<Id> {
    /// The node that compared equal to the key
    pub located: Id,

    /// The node detached from the tree
    ///
    /// When the located node had two children this is its in-order predecessor, whose value has
    /// been copied into `located`. Either way the slot of `unlinked` is no longer referenced by the
    /// tree.
    pub unlinked: Id,
}

/// A broken red-black property found by [`RbTree::validate`]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Violation<Id> {
    #[error("the root {0:?} is red")]
    RedRoot(Id),

    #[error("red node {0:?} has a red child")]
    RedChild(Id),

    #[error("paths below {0:?} contain different numbers of black nodes")]
    BlackHeight(Id),

    #[error("node {0:?} does not point back to its parent")]
    ParentLink(Id),

    #[error("node {0:?} is out of order")]
    Order(Id),
}

fn color_of<S: RbNodes>(nodes: &S, id: Option<S::Id>) -> Color {
    id.map_or(Color::Black, |id| nodes.color(id))
}

/// A red-black tree linking nodes owned by an [`RbNodes`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RbTree<Id> {
    root: Option<Id>,
}

impl<Id> Default for RbTree<Id> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<Id: Copy + Eq + Debug> RbTree<Id> {
    /// An empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree whose nodes are already linked below `root`
    pub fn with_root(root: Option<Id>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<Id> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Link the node `id` into the tree.
    ///
    /// Its previous links are dropped. When a node comparing equal is already present nothing
    /// changes and the id of that node is returned as the error.
    pub fn insert<S>(&mut self, nodes: &mut S, id: Id) -> Result<(), Id>
    where
        S: RbNodes<Id = Id>,
    {
        let mut parent = None;
        let mut current = self.root;
        let mut side = Ordering::Equal;

        while let Some(node) = current {
            side = nodes.node(id).cmp(nodes.node(node));
            parent = Some(node);
            current = match side {
                Ordering::Less => nodes.left(node),
                Ordering::Greater => nodes.right(node),
                Ordering::Equal => return Err(node),
            };
        }

        nodes.set_left(id, None);
        nodes.set_right(id, None);
        nodes.set_parent(id, parent);
        nodes.set_color(id, Color::Red);

        match parent {
            None => self.root = Some(id),
            Some(parent) if side == Ordering::Less => nodes.set_left(parent, Some(id)),
            Some(parent) => nodes.set_right(parent, Some(id)),
        }

        self.insert_fixup(nodes, id);
        Ok(())
    }

    fn insert_fixup<S>(&mut self, nodes: &mut S, mut id: Id)
    where
        S: RbNodes<Id = Id>,
    {
        loop {
            let Some(parent) = nodes.parent(id) else {
                nodes.set_color(id, Color::Black);
                return;
            };

            if nodes.color(parent) == Color::Black {
                return;
            }

            let Some(grandparent) = nodes.parent(parent) else {
                nodes.set_color(parent, Color::Black);
                return;
            };

            let uncle = nodes.uncle(id);
            if let Some(uncle) = uncle.filter(|uncle| nodes.color(*uncle) == Color::Red) {
                nodes.set_color(parent, Color::Black);
                nodes.set_color(uncle, Color::Black);
                nodes.set_color(grandparent, Color::Red);
                id = grandparent;
                continue;
            }

            // rotate an inner grandchild to the outside
            let mut parent = parent;
            if nodes.right(parent) == Some(id) && nodes.left(grandparent) == Some(parent) {
                self.rotate_left(nodes, parent);
                id = parent;
                parent = nodes.parent(id).unwrap_or(parent);
            } else if nodes.left(parent) == Some(id) && nodes.right(grandparent) == Some(parent) {
                self.rotate_right(nodes, parent);
                id = parent;
                parent = nodes.parent(id).unwrap_or(parent);
            }

            nodes.set_color(parent, Color::Black);
            nodes.set_color(grandparent, Color::Red);
            if nodes.left(parent) == Some(id) {
                self.rotate_right(nodes, grandparent);
            } else {
                self.rotate_left(nodes, grandparent);
            }
            return;
        }
    }

    /// Find the node comparing equal to `key`
    pub fn try_lookup<S>(&self, nodes: &S, key: &S::Node) -> Option<Id>
    where
        S: RbNodes<Id = Id>,
    {
        let mut current = self.root;
        while let Some(node) = current {
            current = match key.cmp(nodes.node(node)) {
                Ordering::Less => nodes.left(node),
                Ordering::Greater => nodes.right(node),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Remove the node comparing equal to `key`.
    ///
    /// Returns `None` without touching the tree when no such node exists.
    pub fn delete<S>(&mut self, nodes: &mut S, key: &S::Node) -> Option<Deleted<Id>>
    where
        S: RbNodes<Id = Id>,
    {
        let located = self.try_lookup(nodes, key)?;

        let mut id = located;
        if let (Some(left), Some(_)) = (nodes.left(id), nodes.right(id)) {
            let predecessor = Self::maximum(nodes, left);
            nodes.copy_value(predecessor, id);
            id = predecessor;
        }

        let child = nodes.left(id).or(nodes.right(id));
        if nodes.color(id) == Color::Black {
            match child {
                Some(child) if nodes.color(child) == Color::Red => {
                    nodes.set_color(child, Color::Black)
                }
                _ => self.delete_fixup(nodes, id),
            }
        }

        self.replace_node(nodes, id, child);
        nodes.set_left(id, None);
        nodes.set_right(id, None);
        nodes.set_parent(id, None);

        Some(Deleted {
            located,
            unlinked: id,
        })
    }

    /// Restore the black height after removing the black node `id`, which is still linked in
    /// place and stands in for the missing black.
    fn delete_fixup<S>(&mut self, nodes: &mut S, mut id: Id)
    where
        S: RbNodes<Id = Id>,
    {
        loop {
            let Some(parent) = nodes.parent(id) else {
                return;
            };
            let Some(mut sibling) = nodes.sibling(id) else {
                return;
            };

            if nodes.color(sibling) == Color::Red {
                nodes.set_color(parent, Color::Red);
                nodes.set_color(sibling, Color::Black);
                if nodes.left(parent) == Some(id) {
                    self.rotate_left(nodes, parent);
                } else {
                    self.rotate_right(nodes, parent);
                }
                sibling = match nodes.sibling(id) {
                    Some(sibling) => sibling,
                    None => return,
                };
            }

            let near_left = color_of(nodes, nodes.left(sibling));
            let far_right = color_of(nodes, nodes.right(sibling));

            if nodes.color(sibling) == Color::Black
                && near_left == Color::Black
                && far_right == Color::Black
            {
                nodes.set_color(sibling, Color::Red);
                if nodes.color(parent) == Color::Red {
                    nodes.set_color(parent, Color::Black);
                    return;
                }
                id = parent;
                continue;
            }

            let is_left = nodes.left(parent) == Some(id);
            if is_left && far_right == Color::Black && near_left == Color::Red {
                nodes.set_color(sibling, Color::Red);
                if let Some(inner) = nodes.left(sibling) {
                    nodes.set_color(inner, Color::Black);
                }
                self.rotate_right(nodes, sibling);
            } else if !is_left && near_left == Color::Black && far_right == Color::Red {
                nodes.set_color(sibling, Color::Red);
                if let Some(inner) = nodes.right(sibling) {
                    nodes.set_color(inner, Color::Black);
                }
                self.rotate_left(nodes, sibling);
            }

            let Some(sibling) = nodes.sibling(id) else {
                return;
            };
            nodes.set_color(sibling, nodes.color(parent));
            nodes.set_color(parent, Color::Black);
            if is_left {
                if let Some(outer) = nodes.right(sibling) {
                    nodes.set_color(outer, Color::Black);
                }
                self.rotate_left(nodes, parent);
            } else {
                if let Some(outer) = nodes.left(sibling) {
                    nodes.set_color(outer, Color::Black);
                }
                self.rotate_right(nodes, parent);
            }
            return;
        }
    }

    /// Call `visitor` once for every node of the tree
    pub fn visit<S, F>(&self, nodes: &S, order: Traversal, mut visitor: F)
    where
        S: RbNodes<Id = Id>,
        F: FnMut(Id),
    {
        let mut stack = Vec::new();
        match order {
            Traversal::PreOrder => {
                stack.extend(self.root);
                while let Some(id) = stack.pop() {
                    visitor(id);
                    stack.extend(nodes.right(id));
                    stack.extend(nodes.left(id));
                }
            }
            Traversal::InOrder => {
                let mut current = self.root;
                while current.is_some() || !stack.is_empty() {
                    while let Some(id) = current {
                        stack.push(id);
                        current = nodes.left(id);
                    }
                    if let Some(id) = stack.pop() {
                        visitor(id);
                        current = nodes.right(id);
                    }
                }
            }
        }
    }

    /// Ids of all nodes in ascending order
    pub fn to_vec<S>(&self, nodes: &S) -> Vec<Id>
    where
        S: RbNodes<Id = Id>,
    {
        let mut ids = Vec::new();
        self.visit(nodes, Traversal::InOrder, |id| ids.push(id));
        ids
    }

    /// Number of nodes linked into the tree
    pub fn len<S>(&self, nodes: &S) -> usize
    where
        S: RbNodes<Id = Id>,
    {
        let mut count = 0;
        self.visit(nodes, Traversal::PreOrder, |_| count += 1);
        count
    }

    /// Check ordering, parent links and the red-black properties.
    ///
    /// Returns the black height of the tree, counting the null leaves.
    pub fn validate<S>(&self, nodes: &S) -> Result<usize, Violation<Id>>
    where
        S: RbNodes<Id = Id>,
    {
        let Some(root) = self.root else {
            return Ok(1);
        };

        if nodes.color(root) == Color::Red {
            return Err(Violation::RedRoot(root));
        }
        if nodes.parent(root).is_some() {
            return Err(Violation::ParentLink(root));
        }

        Self::validate_subtree(nodes, root)
    }

    fn validate_subtree<S>(nodes: &S, id: Id) -> Result<usize, Violation<Id>>
    where
        S: RbNodes<Id = Id>,
    {
        let mut heights = [1, 1];
        for (i, child) in [nodes.left(id), nodes.right(id)].into_iter().enumerate() {
            let Some(child) = child else {
                continue;
            };

            if nodes.parent(child) != Some(id) {
                return Err(Violation::ParentLink(child));
            }

            let expected = if i == 0 {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            if nodes.node(child).cmp(nodes.node(id)) != expected {
                return Err(Violation::Order(child));
            }

            if nodes.color(id) == Color::Red && nodes.color(child) == Color::Red {
                return Err(Violation::RedChild(id));
            }

            heights[i] = Self::validate_subtree(nodes, child)?;
        }

        if heights[0] != heights[1] {
            return Err(Violation::BlackHeight(id));
        }

        Ok(heights[0] + usize::from(nodes.color(id) == Color::Black))
    }

    fn maximum<S>(nodes: &S, mut id: Id) -> Id
    where
        S: RbNodes<Id = Id>,
    {
        while let Some(right) = nodes.right(id) {
            id = right;
        }
        id
    }

    fn replace_node<S>(&mut self, nodes: &mut S, old: Id, new: Option<Id>)
    where
        S: RbNodes<Id = Id>,
    {
        let parent = nodes.parent(old);
        match parent {
            None => self.root = new,
            Some(parent) if nodes.left(parent) == Some(old) => nodes.set_left(parent, new),
            Some(parent) => nodes.set_right(parent, new),
        }

        if let Some(new) = new {
            nodes.set_parent(new, parent);
        }
    }

    fn rotate_left<S>(&mut self, nodes: &mut S, id: Id)
    where
        S: RbNodes<Id = Id>,
    {
        let Some(right) = nodes.right(id) else {
            return;
        };

        self.replace_node(nodes, id, Some(right));

        let inner = nodes.left(right);
        nodes.set_right(id, inner);
        if let Some(inner) = inner {
            nodes.set_parent(inner, Some(id));
        }

        nodes.set_left(right, Some(id));
        nodes.set_parent(id, Some(right));
    }

    fn rotate_right<S>(&mut self, nodes: &mut S, id: Id)
    where
        S: RbNodes<Id = Id>,
    {
        let Some(left) = nodes.left(id) else {
            return;
        };

        self.replace_node(nodes, id, Some(left));

        let inner = nodes.right(left);
        nodes.set_left(id, inner);
        if let Some(inner) = inner {
            nodes.set_parent(inner, Some(id));
        }

        nodes.set_right(left, Some(id));
        nodes.set_parent(id, Some(left));
    }
}
