use thiserror::Error;

/// An invariant breach found while auditing a tree.
///
/// Positions count nodes in pre-order, starting at the root with 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("node {position} breaks search order")]
    Unordered { position: usize },
    #[error("node {position} caches height {cached}, subtree height is {actual}")]
    HeightMismatch {
        position: usize,
        cached: usize,
        actual: usize,
    },
    #[error("node {position} caches balance factor {cached}, subtree balance factor is {actual}")]
    BalanceFactorMismatch {
        position: usize,
        cached: i8,
        actual: isize,
    },
    #[error("node {position} is out of balance (balance factor {balance_factor})")]
    Unbalanced {
        position: usize,
        balance_factor: isize,
    },
    #[error("tree records {recorded} elements but {counted} nodes are reachable")]
    SizeMismatch { recorded: usize, counted: usize },
}
