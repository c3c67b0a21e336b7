//! Canonical decision-tree representations shared by the tree ensembles.

/// Canonical node identifier.
///
/// Internally this is just an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod forest;
pub mod leaf;
pub mod tree;

pub use forest::{Forest, ForestValidationError};
pub use leaf::{ClassDistribution, LeafValue, ScalarLeaf};
pub use tree::{Tree, TreeBuilder, TreeValidationError};
