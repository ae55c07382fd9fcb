//! The `Node` tagged union: a Leaf or a Branch, sharing a common header of
//! `parent`, `n`, and `bbox`, mirroring the shared fields on CLAM's
//! `Cluster` while splitting the per-kind data the way the reference
//! Go source splits `Leaf`/`Branch`.

use super::arena::NodeId;
use super::bbox::BoundingBox;

#[derive(Debug, Clone)]
pub struct LeafData {
    /// Caller-supplied identifier. For a Leaf shared by several duplicate
    /// indices, this is one representative key among the duplicates (the
    /// smallest), picked so that `leaves[leaf.index] == leaf` always holds.
    pub index: usize,
    pub depth: usize,
    pub point: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct BranchData {
    pub cut_dim: usize,
    pub cut_val: f64,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(LeafData),
    Branch(BranchData),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    /// Subtree point count: multiplicity for a Leaf, sum of children for a
    /// Branch (invariant P1/P2 in the spec).
    pub n: usize,
    pub bbox: BoundingBox,
    pub kind: NodeKind,
}

impl Node {
    pub fn new_leaf(parent: Option<NodeId>, data: LeafData, n: usize) -> Self {
        let bbox = BoundingBox::of_point(&data.point);
        Node {
            parent,
            n,
            bbox,
            kind: NodeKind::Leaf(data),
        }
    }

    pub fn new_branch(
        parent: Option<NodeId>,
        data: BranchData,
        n: usize,
        bbox: BoundingBox,
    ) -> Self {
        Node {
            parent,
            n,
            bbox,
            kind: NodeKind::Branch(data),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn leaf(&self) -> Option<&LeafData> {
        match &self.kind {
            NodeKind::Leaf(data) => Some(data),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn leaf_mut(&mut self) -> Option<&mut LeafData> {
        match &mut self.kind {
            NodeKind::Leaf(data) => Some(data),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn branch(&self) -> Option<&BranchData> {
        match &self.kind {
            NodeKind::Branch(data) => Some(data),
            NodeKind::Leaf(_) => None,
        }
    }
}
