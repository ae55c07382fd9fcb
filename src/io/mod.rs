//! External collaborators: CSV I/O, a threshold helper, and optional JSON
//! persistence. None of this is part of the core algorithm; it exists so
//! the demo binary has somewhere real to read data from and write scores
//! to.

mod csv;
#[cfg(feature = "serde")]
mod persist;
mod threshold;

pub use self::csv::{read_matrix, read_vector, write_scored_rows};
pub use threshold::threshold;

#[cfg(feature = "serde")]
pub use persist::{load_tree, save_tree, TreeNode};
