//! Optional JSON persistence, behind the `serde` feature. Dumps a tree's
//! shape as a nested `TreeNode` enum via `serde_json` — a read/write
//! helper for inspection and reloading, not a requirement of the core
//! algorithm.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{LeafSnapshot, NodeSnapshot, RcTree};
use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TreeNode {
    Leaf {
        indices: Vec<usize>,
        point: Vec<f64>,
        depth: usize,
    },
    Branch {
        cut_dim: usize,
        cut_val: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl From<&NodeSnapshot> for TreeNode {
    fn from(snapshot: &NodeSnapshot) -> Self {
        match snapshot {
            NodeSnapshot::Leaf(LeafSnapshot { indices, point, depth }) => TreeNode::Leaf {
                indices: indices.clone(),
                point: point.clone(),
                depth: *depth,
            },
            NodeSnapshot::Branch { cut_dim, cut_val, left, right } => TreeNode::Branch {
                cut_dim: *cut_dim,
                cut_val: *cut_val,
                left: Box::new(TreeNode::from(left.as_ref())),
                right: Box::new(TreeNode::from(right.as_ref())),
            },
        }
    }
}

/// Writes a tree's shape to `path` as JSON. A no-op shape for an empty
/// tree is not representable; callers should check `tree.is_empty()`.
pub fn save_tree(path: impl AsRef<Path>, tree: &RcTree) -> Result<(), Error> {
    let snapshot = tree
        .snapshot()
        .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "tree is empty")))?;
    let node = TreeNode::from(&snapshot);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &node)
        .map_err(|err| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

/// Loads a previously saved tree shape back into a `TreeNode`.
pub fn load_tree(path: impl AsRef<Path>) -> Result<TreeNode, Error> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_tree_through_json() {
        let mut tree = RcTree::new(3);
        tree.insert(&[0.0, 0.0], 0, 0.0).unwrap();
        tree.insert(&[1.0, 1.0], 1, 0.0).unwrap();
        tree.insert(&[5.0, 5.0], 2, 0.0).unwrap();

        let dir = std::env::temp_dir().join(format!("rrcf-persist-test-{}", std::process::id()));
        save_tree(&dir, &tree).unwrap();
        let loaded = load_tree(&dir).unwrap();
        std::fs::remove_file(&dir).ok();

        match loaded {
            TreeNode::Branch { .. } => {}
            TreeNode::Leaf { .. } => panic!("a 3-point tree should not collapse to a single leaf"),
        }
    }
}
