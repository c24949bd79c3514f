use crate::mtree::max_values_in_leaf;
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

/// One node of an M-ary search tree.
///
/// A `Link` built by [`Node::build`] always carries `fan_out` children and
/// `fan_out - 1` separators, where `separators[i]` is the largest key stored
/// under `children[i]`. Keys live only in leaves; separators are copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node<K> {
    Leaf {
        values: Vec<K>,
    },
    Link {
        separators: Vec<K>,
        children: Vec<Node<K>>,
    },
}

impl<K> Node<K> {
    pub(super) fn new_leaf() -> Self {
        Node::Leaf { values: Vec::new() }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Keys held directly by this node: data for a leaf, separators for a link.
    pub fn values(&self) -> &[K] {
        match self {
            Node::Leaf { values } => values,
            Node::Link { separators, .. } => separators,
        }
    }

    pub fn children(&self) -> &[Node<K>] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Link { children, .. } => children,
        }
    }

    /// Number of levels below and including this node.
    pub(super) fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Link { children, .. } => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
        }
    }
}

impl<K: Ord + Clone> Node<K> {
    /// Recursively partitions `keys` (strictly ascending) into a subtree.
    ///
    /// More than `fan_out - 1` keys are cut into `fan_out` contiguous slices of
    /// `len / fan_out` keys each, the last slice taking the remainder. The last
    /// key of every slice but the final one becomes a separator.
    pub(super) fn build(mut keys: Vec<K>, fan_out: usize) -> Self {
        if keys.len() <= max_values_in_leaf(fan_out) {
            return Node::Leaf { values: keys };
        }

        // keys.len() >= fan_out here, so every slice holds at least one key
        let slice_len = keys.len() / fan_out;
        let mut separators = Vec::with_capacity(fan_out - 1);
        let mut children = Vec::with_capacity(fan_out);

        for _ in 0..fan_out - 1 {
            let rest = keys.split_off(slice_len);
            let slice = std::mem::replace(&mut keys, rest);

            separators.push(slice[slice_len - 1].clone());
            children.push(Node::build(slice, fan_out));
        }
        children.push(Node::build(keys, fan_out));

        Node::Link {
            separators,
            children,
        }
    }

    /// The child whose range may hold `key`: the first child whose separator is
    /// strictly greater than `key`, or the last child. `None` on a leaf.
    pub(super) fn find_child(&self, key: &K) -> Option<&Node<K>> {
        match self {
            Node::Leaf { .. } => None,
            Node::Link {
                separators,
                children,
            } => {
                let idx = separators.partition_point(|sep| sep <= key);
                children.get(idx)
            }
        }
    }

    /// Top-down lookup pruned by separators. A separator equal to `key` counts
    /// as a hit since every separator is a copy of a leaf key.
    pub(super) fn search(&self, key: &K) -> bool {
        if self.values().contains(key) {
            return true;
        }

        match self.find_child(key) {
            Some(child) => child.search(key),
            None => false,
        }
    }

    /// Exhaustive lookup: visits every leaf and ignores separators.
    pub(super) fn find(&self, key: &K) -> bool {
        match self {
            Node::Leaf { values } => values.contains(key),
            Node::Link { children, .. } => children.iter().any(|child| child.find(key)),
        }
    }

    /// Appends every leaf key, left to right.
    pub(super) fn collect_into(&self, out: &mut Vec<K>) {
        match self {
            Node::Leaf { values } => out.extend(values.iter().cloned()),
            Node::Link { children, .. } => {
                for child in children {
                    child.collect_into(out);
                }
            }
        }
    }

    fn last_value(&self) -> Option<&K> {
        match self {
            Node::Leaf { values } => values.last(),
            Node::Link { children, .. } => children.last().and_then(Node::last_value),
        }
    }

    /// Verifies the subtree shape and ordering, returning the number of keys
    /// stored in its leaves. Every key must be in `(lower, upper]`.
    pub(super) fn check(
        &self,
        fan_out: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<usize, String>
    where
        K: Debug,
    {
        match self {
            Node::Leaf { values } => {
                if values.len() > max_values_in_leaf(fan_out) {
                    return Err(format!(
                        "leaf holds {} values, fan-out {} allows {}",
                        values.len(),
                        fan_out,
                        max_values_in_leaf(fan_out)
                    ));
                }
                check_ascending(values)?;
                check_bounds(values, lower, upper)?;
                Ok(values.len())
            }
            Node::Link {
                separators,
                children,
            } => {
                if children.len() != fan_out || separators.len() != fan_out - 1 {
                    return Err(format!(
                        "link has {} children and {} separators, expected {} and {}",
                        children.len(),
                        separators.len(),
                        fan_out,
                        fan_out - 1
                    ));
                }
                check_ascending(separators)?;
                check_bounds(separators, lower, upper)?;

                let mut count = 0;
                for (i, child) in children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { separators.get(i - 1) };
                    let child_upper = separators.get(i).or(upper);
                    count += child.check(fan_out, child_lower, child_upper)?;

                    if let Some(sep) = separators.get(i) {
                        if child.last_value() != Some(sep) {
                            return Err(format!(
                                "separator {:?} is not the last key of child {} ({:?})",
                                sep,
                                i,
                                child.last_value()
                            ));
                        }
                    }
                }
                Ok(count)
            }
        }
    }
}

fn check_ascending<K: Ord + Debug>(keys: &[K]) -> Result<(), String> {
    match keys.windows(2).find(|pair| pair[0] >= pair[1]) {
        Some(pair) => Err(format!("keys out of order: {:?} then {:?}", pair[0], pair[1])),
        None => Ok(()),
    }
}

fn check_bounds<K: Ord + Debug>(keys: &[K], lower: Option<&K>, upper: Option<&K>) -> Result<(), String> {
    for key in keys {
        if lower.is_some_and(|lo| key <= lo) || upper.is_some_and(|hi| key > hi) {
            return Err(format!("key {:?} outside ({:?}, {:?}]", key, lower, upper));
        }
    }
    Ok(())
}

impl<K: Debug> Node<K> {
    fn fmt_depth(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result {
        f.write_str(&" ".repeat(depth))?;
        match self {
            Node::Leaf { values } => writeln!(f, "values: {:?}", values),
            Node::Link {
                separators,
                children,
            } => {
                writeln!(f, "separators: {:?}", separators)?;
                for child in children {
                    child.fmt_depth(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl<K: Debug> Display for Node<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_depth(f, 1)
    }
}

/// In-order iterator over the keys stored in the leaves of a subtree.
pub struct Iter<'a, K> {
    stack: Vec<std::slice::Iter<'a, Node<K>>>,
    leaf: std::slice::Iter<'a, K>,
}

impl<'a, K> Iter<'a, K> {
    pub(super) fn new(root: &'a Node<K>) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            leaf: Default::default(),
        };
        iter.descend(root);
        iter
    }

    fn descend(&mut self, node: &'a Node<K>) {
        match node {
            Node::Leaf { values } => self.leaf = values.iter(),
            Node::Link { children, .. } => self.stack.push(children.iter()),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            if let Some(key) = self.leaf.next() {
                return Some(key);
            }
            match self.stack.last_mut()?.next() {
                Some(child) => self.descend(child),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
