pub mod error;
pub mod node;
pub mod tree;

#[cfg(test)]
mod proptests;

pub use error::MTreeError;
pub use node::Node;
pub use tree::MTree;

/// Smallest fan-out for which the partition in `Node::build` makes progress.
pub const MIN_FAN_OUT: usize = 2;

const fn max_values_in_leaf(fan_out: usize) -> usize {
    fan_out - 1
}
