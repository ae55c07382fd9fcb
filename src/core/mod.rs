//! Core tree data structure: arena, node, bounding box, and `RcTree`.

mod arena;
mod bbox;
mod node;
mod tree;

pub use arena::{Arena, NodeId};
pub use bbox::BoundingBox;
pub use node::{BranchData, LeafData, Node, NodeKind};
pub use tree::{LeafSnapshot, NodeSnapshot, RcTree};
