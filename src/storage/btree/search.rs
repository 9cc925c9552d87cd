use std::fmt;

use super::node::{child_slot, LeafNode, Node, NodeId};
use super::tree::OrderedIndex;

/// Comparison operators understood by [`OrderedIndex::range_search`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RangeOp {
    /// Keys less than or equal to the bound (`<=`).
    Le,
    /// Keys equal to the bound (`==`).
    Eq,
    /// Keys greater than or equal to the bound (`>=`).
    Ge,
}

impl RangeOp {
    /// Parses `<=`, `==` or `>=`; anything else yields `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "<=" => Some(RangeOp::Le),
            "==" => Some(RangeOp::Eq),
            ">=" => Some(RangeOp::Ge),
            _ => None,
        }
    }

    /// Canonical spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            RangeOp::Le => "<=",
            RangeOp::Eq => "==",
            RangeOp::Ge => ">=",
        }
    }

    /// Whether `key` satisfies the operator against `bound`.
    pub fn matches<K: Ord>(self, key: &K, bound: &K) -> bool {
        match self {
            RangeOp::Le => key <= bound,
            RangeOp::Eq => key == bound,
            RangeOp::Ge => key >= bound,
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<K: Ord, V> OrderedIndex<K, V> {
    /// Returns every value whose key satisfies `comparator` against `key`.
    ///
    /// `comparator` is one of `<=`, `==`, `>=`. Any other string produces an
    /// empty result rather than an error, as does an empty tree.
    ///
    /// Results come back in scan order: `<=` walks leftward from the bound
    /// (descending keys), `>=` walks rightward (ascending keys), and `==`
    /// returns the leftward matches followed by matches from the next leaf on.
    /// Callers that need key order must sort.
    pub fn range_search(&self, key: &K, comparator: &str) -> Vec<&V> {
        match RangeOp::parse(comparator) {
            Some(op) => self.range_search_op(key, op),
            None => Vec::new(),
        }
    }

    /// Typed variant of [`OrderedIndex::range_search`].
    pub fn range_search_op(&self, key: &K, op: RangeOp) -> Vec<&V> {
        self.stats.inc_range_searches();
        let Some(leaf_id) = self.find_leaf(key, op == RangeOp::Le) else {
            return Vec::new();
        };
        let Some(leaf) = self.node(leaf_id).as_leaf() else {
            return Vec::new();
        };
        match op {
            RangeOp::Eq => {
                let mut found = self.scan_left(leaf_id, leaf.keys.len(), key, op);
                if let Some(next) = leaf.next {
                    found.extend(self.scan_right(next, 0, key, op));
                }
                found
            }
            RangeOp::Le => self.scan_left(leaf_id, leaf.keys.len(), key, op),
            RangeOp::Ge => self.scan_right(leaf_id, 0, key, op),
        }
    }

    fn find_leaf(&self, key: &K, right_biased: bool) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.node(current) {
                Node::Internal(internal) => {
                    let slot = child_slot(&internal.keys, key, right_biased);
                    current = internal.children[slot];
                }
                Node::Leaf(_) => return Some(current),
            }
        }
    }

    /// Walks from `end` (exclusive) in `start` toward the head of the chain.
    fn scan_left(&self, start: NodeId, end: usize, key: &K, op: RangeOp) -> Vec<&V> {
        let mut found = Vec::new();
        let mut current = self.leaf(start);
        let mut end = end;
        while let Some(leaf) = current {
            for idx in (0..end.min(leaf.keys.len())).rev() {
                if op.matches(&leaf.keys[idx], key) {
                    found.push(&leaf.values[idx]);
                }
            }
            current = leaf.prev.and_then(|prev| self.leaf(prev));
            end = usize::MAX;
        }
        found
    }

    /// Walks from `begin` in `start` toward the tail of the chain.
    fn scan_right(&self, start: NodeId, begin: usize, key: &K, op: RangeOp) -> Vec<&V> {
        let mut found = Vec::new();
        let mut current = self.leaf(start);
        let mut begin = begin;
        while let Some(leaf) = current {
            for idx in begin..leaf.keys.len() {
                if op.matches(&leaf.keys[idx], key) {
                    found.push(&leaf.values[idx]);
                }
            }
            current = leaf.next.and_then(|next| self.leaf(next));
            begin = 0;
        }
        found
    }

    fn leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.node(id).as_leaf()
    }
}
