//! Error kinds raised by the core tree, forest, and I/O helpers.

use std::fmt;

/// Everything that can go wrong while building, mutating, or scoring a
/// [`crate::core::RcTree`] or a [`crate::forest::Forest`].
#[derive(Debug)]
pub enum Error {
    /// `insert` was called with a point whose length does not match the
    /// tree's established dimension.
    DimensionMismatch { expected: usize, got: usize },
    /// `insert` was called with an `index` already present in the leaves
    /// map, for a point that is not a duplicate of the existing one.
    DuplicateIndex { index: usize },
    /// The descent in `insert` ran out of depth budget without placing a
    /// cut. Indicates numerical degeneracy in the input.
    CutNotFound,
    /// `codisp`, `disp`, or `forget` were called with an index that is not
    /// in the tree's leaves map.
    UnknownLeaf { index: usize },
    /// `insert_point_cut` could not find a dimension whose cumulative span
    /// reached the drawn offset; only possible for an all-zero bounding box.
    CutDimensionOverflow,
    /// A per-tree error from within a `Forest` operation, tagged with the
    /// index of the tree that raised it.
    Forest {
        tree_index: usize,
        source: Box<Error>,
    },
    /// A filesystem or CSV-parsing failure from one of the I/O helpers.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch { expected, got } => write!(
                f,
                "point dimension ({got}) not equal to existing points in tree ({expected})"
            ),
            Error::DuplicateIndex { index } => {
                write!(f, "index {index} already exists in leaves map")
            }
            Error::CutNotFound => write!(f, "a cut was not found while inserting"),
            Error::UnknownLeaf { index } => write!(f, "index {index} not found in leaves map"),
            Error::CutDimensionOverflow => write!(f, "cut dimension is too large"),
            Error::Forest { tree_index, source } => {
                write!(f, "tree {tree_index} failed: {source}")
            }
            Error::Io(source) => write!(f, "I/O error: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Forest { source, .. } => Some(source.as_ref()),
            Error::Io(source) => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io(source)
    }
}
