use crate::mtree::node::{Iter, Node};
use crate::mtree::{MTreeError, MIN_FAN_OUT};
use log::{debug, trace};
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

/// An M-ary search tree that is rebuilt from scratch on every mutation.
///
/// Inserts and removals flatten the tree into its sorted key sequence, edit
/// that sequence and partition it again with [`MTree::build_tree`]. The shape
/// of the tree is therefore a pure function of its contents and fan-out.
#[derive(Debug, Clone, Serialize)]
pub struct MTree<K> {
    fan_out: usize,
    len: usize,
    root: Node<K>,
}

impl<K: Debug> Display for MTree<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "root (fan-out {}, {} keys)", self.fan_out, self.len)?;
        write!(f, "{}", self.root)
    }
}

impl<K> MTree<K> {
    pub fn new(fan_out: usize) -> Result<Self, MTreeError> {
        if fan_out < MIN_FAN_OUT {
            return Err(MTreeError::InvalidFanOut(fan_out));
        }

        Ok(MTree {
            fan_out,
            len: 0,
            root: Node::new_leaf(),
        })
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn root(&self) -> &Node<K> {
        &self.root
    }

    /// Keys in ascending order, borrowed from the leaves.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.root)
    }
}

impl<K: Ord + Clone + Debug> MTree<K> {
    pub fn from_sorted(fan_out: usize, keys: Vec<K>) -> Result<Self, MTreeError> {
        let mut tree = MTree::new(fan_out)?;
        tree.build_tree(keys)?;
        Ok(tree)
    }

    /// Replaces the whole tree with one partitioned from `keys`.
    ///
    /// `keys` must be strictly ascending; otherwise the tree is left untouched.
    pub fn build_tree(&mut self, keys: Vec<K>) -> Result<(), MTreeError> {
        if let Some(position) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(MTreeError::UnsortedInput {
                position: position + 1,
            });
        }

        self.rebuild_from(keys);
        Ok(())
    }

    /// `keys` is known to be strictly ascending.
    fn rebuild_from(&mut self, keys: Vec<K>) {
        // release the old subtree before allocating the new one
        self.root = Node::new_leaf();

        self.len = keys.len();
        self.root = Node::build(keys, self.fan_out);

        debug!("rebuilt tree with {} keys, depth {}", self.len, self.depth());
        trace!("tree after rebuild:\n{}", self);
    }

    /// Adds `key`, returning `false` without touching the tree if it is
    /// already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.find(&key) {
            debug!("insert of {:?} rejected, key already present", key);
            return false;
        }

        let mut keys = self.collect_values();
        let pos = keys.partition_point(|k| k < &key);
        keys.insert(pos, key);
        self.rebuild_from(keys);

        true
    }

    pub fn remove(&mut self, key: &K) -> Result<(), MTreeError> {
        let mut keys = self.collect_values();
        let Some(pos) = keys.iter().position(|k| k == key) else {
            debug!("remove of {:?} failed, key not present", key);
            return Err(MTreeError::KeyNotFound);
        };

        keys.remove(pos);
        self.rebuild_from(keys);

        Ok(())
    }

    /// Descends from the root following separators. Costs one node per level.
    pub fn search(&self, key: &K) -> bool {
        self.root.search(key)
    }

    /// Scans every leaf. Agrees with [`MTree::search`] but visits the whole
    /// tree; `insert` uses it for its existence check.
    pub fn find(&self, key: &K) -> bool {
        self.root.find(key)
    }

    /// All keys in ascending order. Separators are not included.
    pub fn collect_values(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len);
        self.root.collect_into(&mut keys);
        keys
    }

    /// Re-partitions the current contents, restoring the canonical shape.
    pub fn rebuild(&mut self) {
        let keys = self.collect_values();
        self.rebuild_from(keys);
    }

    /// Walks the whole tree and reports the first broken structural rule.
    pub fn check_invariants(&self) -> Result<(), String> {
        let count = self.root.check(self.fan_out, None, None)?;
        if count != self.len {
            return Err(format!("tree caches {} keys but leaves hold {}", self.len, count));
        }
        Ok(())
    }
}
