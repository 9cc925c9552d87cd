use std::collections::VecDeque;
use std::fmt::{self, Write as _};

use tracing::trace;

use super::node::{child_slot, InternalNode, LeafNode, Node, NodeId};
use super::stats::{IndexStats, IndexStatsSnapshot};
use crate::types::{LarderError, Result};

/// In-memory B+ tree mapping ordered keys to values.
///
/// Nodes live in an arena owned by the tree. Internal nodes own their children
/// by index; leaves are additionally linked left-to-right through `next` /
/// `prev` so range searches can walk sideways without re-descending.
///
/// Duplicate keys are accepted and kept adjacent. There is no delete path: a
/// tree only grows until it is dropped and rebuilt.
///
/// The tree is not thread-safe. Callers that share one across threads must
/// provide their own synchronization.
pub struct OrderedIndex<K, V> {
    pub(super) nodes: Vec<Node<K, V>>,
    pub(super) root: Option<NodeId>,
    pub(super) branching_factor: usize,
    pub(super) len: usize,
    pub(super) stats: IndexStats,
}

impl<K: Ord + Clone, V> OrderedIndex<K, V> {
    /// Creates an empty tree.
    ///
    /// Fails with [`LarderError::InvalidBranchingFactor`] unless
    /// `branching_factor > 2`.
    pub fn new(branching_factor: usize) -> Result<Self> {
        if branching_factor <= 2 {
            return Err(LarderError::InvalidBranchingFactor(branching_factor));
        }
        Ok(Self {
            nodes: Vec::new(),
            root: None,
            branching_factor,
            len: 0,
            stats: IndexStats::default(),
        })
    }

    /// Inserts `value` under `key`, splitting overflowing nodes bottom-up.
    pub fn insert(&mut self, key: K, value: V) {
        self.stats.inc_inserts();
        self.len += 1;
        let Some(root) = self.root else {
            let mut leaf = LeafNode::new();
            leaf.insert(key, value);
            self.root = Some(self.alloc(Node::Leaf(leaf)));
            return;
        };

        self.insert_into(root, key, value);
        if self.node(root).is_overflow(self.branching_factor) {
            let (separator, sibling) = self.split(root);
            let new_root = self.alloc(Node::Internal(InternalNode {
                keys: vec![separator],
                children: vec![root, sibling],
            }));
            self.root = Some(new_root);
            self.stats.inc_root_splits();
            trace!(height = self.height(), "btree.split.root");
        }
    }

    fn insert_into(&mut self, id: NodeId, key: K, value: V) {
        let (slot, child) = match &mut self.nodes[id.0] {
            Node::Leaf(leaf) => {
                leaf.insert(key, value);
                return;
            }
            Node::Internal(internal) => {
                let slot = child_slot(&internal.keys, &key, false);
                (slot, internal.children[slot])
            }
        };
        self.insert_into(child, key, value);

        if self.node(child).is_overflow(self.branching_factor) {
            let (separator, sibling) = self.split(child);
            if let Node::Internal(parent) = &mut self.nodes[id.0] {
                parent.keys.insert(slot, separator);
                parent.children.insert(slot + 1, sibling);
            }
        }
    }

    /// Splits an overflowing node, returning the promoted key and the new right sibling.
    ///
    /// The left node keeps the first `n / 2` keys. A leaf keeps the promoted key
    /// as the first key of its new sibling; an internal node drops it from the
    /// sibling because the parent separator now represents it.
    fn split(&mut self, id: NodeId) -> (K, NodeId) {
        let sibling_id = NodeId(self.nodes.len());
        match &mut self.nodes[id.0] {
            Node::Leaf(leaf) => {
                let mid = leaf.keys.len() / 2;
                let keys = leaf.keys.split_off(mid);
                let values = leaf.values.split_off(mid);
                let separator = keys[0].clone();
                let old_next = leaf.next.replace(sibling_id);
                let sibling = LeafNode {
                    keys,
                    values,
                    next: old_next,
                    prev: Some(id),
                };
                self.nodes.push(Node::Leaf(sibling));
                if let Some(next) = old_next {
                    if let Node::Leaf(next_leaf) = &mut self.nodes[next.0] {
                        next_leaf.prev = Some(sibling_id);
                    }
                }
                self.stats.inc_leaf_splits();
                trace!(left = mid, "btree.split.leaf");
                (separator, sibling_id)
            }
            Node::Internal(internal) => {
                let mid = internal.keys.len() / 2;
                let mut keys = internal.keys.split_off(mid);
                let children = internal.children.split_off(mid + 1);
                let separator = keys.remove(0);
                self.nodes
                    .push(Node::Internal(InternalNode { keys, children }));
                self.stats.inc_internal_splits();
                trace!(left = mid, "btree.split.internal");
                (separator, sibling_id)
            }
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

impl<K, V> OrderedIndex<K, V> {
    pub(super) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.0]
    }

    /// Number of inserted pairs, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` before the first insert.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Maximum key count a node may reach before it splits.
    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    /// Number of levels, counting the leaf level; zero for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = match self.node(id) {
                Node::Internal(internal) => internal.children.first().copied(),
                Node::Leaf(_) => None,
            };
        }
        height
    }

    /// Live statistics counters.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Snapshot of the statistics counters.
    pub fn stats_snapshot(&self) -> IndexStatsSnapshot {
        self.stats.snapshot()
    }

    pub(super) fn leftmost_leaf(&self) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.node(current) {
                Node::Internal(internal) => current = internal.children[0],
                Node::Leaf(_) => return Some(current),
            }
        }
    }

    /// Walks the leaf chain from the leftmost leaf, yielding entries in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            leaf: self.leftmost_leaf(),
            pos: 0,
        }
    }

    /// Keys in leaf-chain order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }
}

impl<K: fmt::Debug, V> OrderedIndex<K, V> {
    /// Breadth-first, level-by-level rendering of every node's keys.
    ///
    /// Each line is one level; the children of one parent are grouped in
    /// braces, e.g. `{[0.2, 0.5]}` then `{[0.0], [0.2], [0.5, 0.8]}`.
    pub fn debug_string(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut level: VecDeque<Vec<NodeId>> = VecDeque::from([vec![root]]);
        while !level.is_empty() {
            let mut next_level = VecDeque::new();
            let groups = level.len();
            for (idx, group) in level.drain(..).enumerate() {
                out.push('{');
                for (pos, id) in group.iter().enumerate() {
                    if pos > 0 {
                        out.push_str(", ");
                    }
                    let node = &self.nodes[id.0];
                    let _ = write!(out, "{:?}", node.keys());
                    if let Node::Internal(internal) = node {
                        next_level.push_back(internal.children.clone());
                    }
                }
                out.push('}');
                if idx + 1 < groups {
                    out.push_str(", ");
                }
            }
            out.push('\n');
            level = next_level;
        }
        out
    }
}

impl<K: fmt::Debug, V> fmt::Debug for OrderedIndex<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedIndex")
            .field("branching_factor", &self.branching_factor)
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}

/// In-order iterator over the leaf chain.
pub struct Iter<'a, K, V> {
    tree: &'a OrderedIndex<K, V>,
    leaf: Option<NodeId>,
    pos: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.tree.node(self.leaf?).as_leaf()?;
            if self.pos < leaf.keys.len() {
                let item = (&leaf.keys[self.pos], &leaf.values[self.pos]);
                self.pos += 1;
                return Some(item);
            }
            self.leaf = leaf.next;
            self.pos = 0;
        }
    }
}
