//! The node graph: an arena of leaf and interior nodes linked by index
//! rather than by pointer or reference, mirroring pymerkle's `Node`/`Leaf`
//! object graph without its per-node heap allocations.

use crate::hashing::HashEngine;

/// An index into a [`NodeArena`]. Stable for the lifetime of the arena: node
/// indices are never reused or compacted, so a `NodeId` obtained from one
/// call remains valid for every later call on the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug)]
pub(crate) enum Node {
    Leaf(Leaf),
    Interior(Interior),
}

#[derive(Debug)]
pub(crate) struct Leaf {
    pub(crate) digest: Vec<u8>,
    pub(crate) parent: Option<NodeId>,
    /// The leaf immediately to this leaf's right in append order, forming
    /// the leaf-successor chain pymerkle's `Leaf.__next` implements.
    pub(crate) next: Option<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Interior {
    pub(crate) digest: Vec<u8>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
}

impl Node {
    pub(crate) fn digest(&self) -> &[u8] {
        match self {
            Node::Leaf(leaf) => &leaf.digest,
            Node::Interior(interior) => &interior.digest,
        }
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf(leaf) => leaf.parent,
            Node::Interior(interior) => interior.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        match self {
            Node::Leaf(leaf) => leaf.parent = Some(parent),
            Node::Interior(interior) => interior.parent = Some(parent),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

/// An arena of [`Node`]s, addressed by [`NodeId`].
///
/// `NodeArena` owns every node a [`crate::Tree`] ever creates; nodes are
/// never removed, only appended, so that a [`NodeId`] handed out for an
/// audit or consistency path remains valid across later appends.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Inserts a leaf built `from_data`, matching pymerkle's
    /// `Leaf.from_data(data, engine)` constructor.
    pub(crate) fn insert_leaf_from_data(&mut self, engine: &HashEngine, data: &[u8]) -> NodeId {
        let digest = engine.hash_data(data);
        self.insert_leaf(digest)
    }

    pub(crate) fn insert_leaf(&mut self, digest: Vec<u8>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Leaf(Leaf {
            digest,
            parent: None,
            next: None,
        }));
        id
    }

    /// Inserts an interior node `from_children`, matching pymerkle's
    /// `Node.from_children(left, right, engine)` constructor, and wires up
    /// both children's parent links.
    pub(crate) fn insert_from_children(&mut self, engine: &HashEngine, left: NodeId, right: NodeId) -> NodeId {
        let digest = engine.hash_pair(self.get(left).digest(), self.get(right).digest());
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Interior(Interior {
            digest,
            parent: None,
            left,
            right,
        }));
        self.get_mut(left).set_parent(id);
        self.get_mut(right).set_parent(id);
        id
    }

    pub(crate) fn link_leaf_chain(&mut self, earlier: NodeId, later: NodeId) {
        if let Node::Leaf(leaf) = self.get_mut(earlier) {
            leaf.next = Some(later);
        }
    }

    pub(crate) fn is_left_child(&self, id: NodeId) -> bool {
        match self.get(id).parent() {
            Some(parent) => match self.get(parent) {
                Node::Interior(interior) => interior.left == id,
                Node::Leaf(_) => false,
            },
            None => false,
        }
    }

    pub(crate) fn is_right_child(&self, id: NodeId) -> bool {
        match self.get(id).parent() {
            Some(parent) => match self.get(parent) {
                Node::Interior(interior) => interior.right == id,
                Node::Leaf(_) => false,
            },
            None => false,
        }
    }

    /// Returns the ancestor `degree` steps above `id`, or `None` if the
    /// chain runs out before reaching that degree. `degree == 0` returns
    /// `id` itself, matching pymerkle's `Node.ancestor(degree)`.
    pub(crate) fn ancestor(&self, id: NodeId, degree: usize) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..degree {
            current = self.get(current).parent()?;
        }
        Some(current)
    }

    pub(crate) fn recalculate_hash(&mut self, engine: &HashEngine, id: NodeId) {
        let new_digest = match self.get(id) {
            Node::Leaf(_) => return,
            Node::Interior(interior) => engine.hash_pair(self.get(interior.left).digest(), self.get(interior.right).digest()),
        };
        if let Node::Interior(interior) = self.get_mut(id) {
            interior.digest = new_digest;
        }
    }
}
