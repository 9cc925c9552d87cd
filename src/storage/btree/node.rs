/// Index of a node inside the tree's arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// Separator keys and owned children of a non-leaf node.
///
/// `children.len() == keys.len() + 1` holds for every reachable internal node.
#[derive(Clone, Debug)]
pub(crate) struct InternalNode<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
}

/// Sorted entries of a leaf plus its lateral links in the leaf chain.
///
/// `next` and `prev` never own anything; ownership flows only through
/// [`InternalNode::children`].
#[derive(Clone, Debug)]
pub(crate) struct LeafNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) next: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            next: None,
            prev: None,
        }
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Inserts in front of the first key that is not smaller than `key`.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let pos = self.keys.partition_point(|existing| existing < &key);
        self.keys.insert(pos, key);
        self.values.insert(pos, value);
    }
}

impl<K, V> Node<K, V> {
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => &internal.keys,
            Node::Leaf(leaf) => &leaf.keys,
        }
    }

    /// A node overflows once it holds `branching_factor` keys.
    pub(crate) fn is_overflow(&self, branching_factor: usize) -> bool {
        self.keys().len() >= branching_factor
    }

    pub(crate) fn as_leaf(&self) -> Option<&LeafNode<K, V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }
}

/// Picks the child slot to descend into.
///
/// `right_biased` advances past separators equal to `key` (used by `<=`
/// searches); otherwise descent stops at the first separator not smaller than
/// `key` (inserts, `==` and `>=`).
pub(crate) fn child_slot<K: Ord>(keys: &[K], key: &K, right_biased: bool) -> usize {
    if right_biased {
        keys.partition_point(|sep| sep <= key)
    } else {
        keys.partition_point(|sep| sep < key)
    }
}
