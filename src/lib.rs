//! An ordered set backed by a height-balanced (AVL) binary search tree.
//!
//! Every node caches its subtree height and balance factor. Insertion and removal
//! repair both along the search path and rotate where the balance factor reaches
//! +2 or -2, so the tree height stays logarithmic in the number of values.
//!
//! The tree is a plain owned value without interior mutability. Callers sharing
//! one tree between threads serialize access themselves, e.g. with a `Mutex`.

mod error;
mod tree;

pub use error::ConsistencyError;
pub use tree::{AvlTree, Node};
