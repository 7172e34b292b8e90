use std::cmp::{self, Ordering};
use std::collections::VecDeque;
use std::fmt;

use log::{debug, trace};

use crate::error::ConsistencyError;

/// An ordered set implemented with an AVL tree.
///
/// ```
/// use avl_tree::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(10);
/// tree.insert(20);
/// tree.insert(30);
/// assert_eq!(tree.inorder(), [&10, &20, &30]);
/// assert_eq!(tree.height(), Some(1));
/// assert_eq!(tree.remove(&20), Some(20));
/// assert!(!tree.contains(&20));
/// ```
#[derive(Clone)]
pub struct AvlTree<T> {
    root: Link<T>,
    num_nodes: usize,
}

/// A node of an [`AvlTree`], exposed read-only for inspecting the tree shape.
#[derive(Clone)]
pub struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    height: usize,
    balance: i8,
}

type Link<T> = Option<Box<Node<T>>>;

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the cached height of the root node, where a single leaf has height 0.
    /// Returns `None` for an empty tree.
    pub fn height(&self) -> Option<usize> {
        self.root.as_ref().map(|root| root.height)
    }

    /// Returns the root node, if any.
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    /// Resets the tree to the empty state.
    pub fn clear(&mut self) {
        debug!("clearing tree of {} values", self.num_nodes);
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a reference to the stored value equal to the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.find(value).map(|node| &node.value)
    }

    /// Returns true if the tree contains the given value.
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).map_or(false, |found| found == value)
    }

    /// Inserts a value into the tree.
    /// Returns false, leaving the tree untouched, if an equal value is already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.contains(&value) {
            return false;
        }
        let mut rebalanced = false;
        self.root = Some(Self::insert_into(self.root.take(), value, &mut rebalanced));
        self.num_nodes += 1;
        true
    }

    /// Removes a value from the tree.
    /// Returns the removed value if it was present.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        self.find(value)?;
        let (root, removed) = Self::remove_from(self.root.take(), value);
        self.root = root;
        debug_assert!(removed.is_some());
        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        removed
    }

    /// Returns the values node-before-children.
    pub fn preorder(&self) -> Vec<&T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        Self::traverse(
            self.root.as_deref(),
            &mut |node| values.push(&node.value),
            &mut |_| {},
            &mut |_| {},
        );
        values
    }

    /// Returns the values in ascending order.
    pub fn inorder(&self) -> Vec<&T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        Self::traverse(
            self.root.as_deref(),
            &mut |_| {},
            &mut |node| values.push(&node.value),
            &mut |_| {},
        );
        values
    }

    /// Returns the values children-before-node.
    pub fn postorder(&self) -> Vec<&T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        Self::traverse(
            self.root.as_deref(),
            &mut |_| {},
            &mut |_| {},
            &mut |node| values.push(&node.value),
        );
        values
    }

    /// Returns the values breadth-first, left child before right child.
    pub fn levelorder(&self) -> Vec<&T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        let mut queue = VecDeque::new();
        queue.extend(self.root.as_deref());
        while let Some(node) = queue.pop_front() {
            values.push(&node.value);
            queue.extend(node.left.as_deref());
            queue.extend(node.right.as_deref());
        }
        values
    }

    /// Audits search order, cached heights and balance factors, the AVL condition
    /// and the element count.
    pub fn validate(&self) -> Result<(), ConsistencyError> {
        let mut num_nodes = 0;
        Self::validate_subtree(self.root.as_deref(), None, None, &mut num_nodes)?;
        if num_nodes != self.num_nodes {
            return Err(ConsistencyError::SizeMismatch {
                recorded: self.num_nodes,
                counted: num_nodes,
            });
        }
        Ok(())
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        if let Err(err) = self.validate() {
            panic!("inconsistent tree: {err}");
        }
    }

    fn find(&self, value: &T) -> Option<&Node<T>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match value.cmp(&node.value) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            }
        }
        current
    }

    // Attaches a new leaf below the given subtree and repairs the search path on the way back up.
    // Once a rotation happened, the remaining ancestors only need their metadata refreshed.
    fn insert_into(link: Link<T>, value: T, rebalanced: &mut bool) -> Box<Node<T>> {
        let mut node = match link {
            None => return Node::create(value),
            Some(node) => node,
        };
        if value < node.value {
            node.left = Some(Self::insert_into(node.left.take(), value, rebalanced));
        } else {
            node.right = Some(Self::insert_into(node.right.take(), value, rebalanced));
        }
        if *rebalanced {
            Self::adjust_height(&mut node);
            return node;
        }
        let (node, did_rebalance) = Self::rebalance_node(node);
        *rebalanced = did_rebalance;
        node
    }

    // Unlike insertion, every ancestor of the removal point may need a rotation.
    fn remove_from(link: Link<T>, value: &T) -> (Link<T>, Option<T>) {
        let mut node = match link {
            None => return (None, None),
            Some(node) => node,
        };
        let removed = match value.cmp(&node.value) {
            Ordering::Equal => {
                let (replacement, removed) = Self::unlink_node(node);
                return (replacement, Some(removed));
            }
            Ordering::Less => {
                let (left, removed) = Self::remove_from(node.left.take(), value);
                node.left = left;
                removed
            }
            Ordering::Greater => {
                let (right, removed) = Self::remove_from(node.right.take(), value);
                node.right = right;
                removed
            }
        };
        (Some(Self::rebalance_node(node).0), removed)
    }

    // Returns the subtree replacing the given node together with the node's value.
    fn unlink_node(mut node: Box<Node<T>>) -> (Link<T>, T) {
        match (node.left.take(), node.right.take()) {
            (None, None) => (None, node.value),
            (Some(child), None) | (None, Some(child)) => (Some(child), node.value),
            (left, Some(right)) => {
                // Successor has no left child, so unlinking it is a stem or leaf removal
                let (right, successor) = Self::remove_min(right);
                node.left = left;
                node.right = right;
                let removed = std::mem::replace(&mut node.value, successor);
                (Some(Self::rebalance_node(node).0), removed)
            }
        }
    }

    fn remove_min(mut node: Box<Node<T>>) -> (Link<T>, T) {
        match node.left.take() {
            None => {
                let right = node.right.take();
                (right, node.value)
            }
            Some(left) => {
                let (left, min) = Self::remove_min(left);
                node.left = left;
                (Some(Self::rebalance_node(node).0), min)
            }
        }
    }

    fn left_height(node: &Node<T>) -> usize {
        match &node.left {
            None => 0,
            Some(left) => left.height + 1,
        }
    }

    fn right_height(node: &Node<T>) -> usize {
        match &node.right {
            None => 0,
            Some(right) => right.height + 1,
        }
    }

    fn adjust_height(node: &mut Node<T>) {
        let left_height = Self::left_height(node);
        let right_height = Self::right_height(node);
        node.height = cmp::max(left_height, right_height);
        node.balance = (left_height as isize - right_height as isize) as i8;
    }

    // Resolves a right-heavy imbalance. Goes through the right child's left child
    // (right-left double rotation) if the right child leans left.
    fn rotate_left(mut node: Box<Node<T>>) -> Box<Node<T>> {
        let mut right = match node.right.take() {
            None => return node,
            Some(right) => right,
        };
        if right.balance > 0 {
            if let Some(mut pivot) = right.left.take() {
                trace!("right-left rotation");
                node.right = pivot.left.take();
                right.left = pivot.right.take();
                Self::adjust_height(&mut node);
                Self::adjust_height(&mut right);
                pivot.left = Some(node);
                pivot.right = Some(right);
                Self::adjust_height(&mut pivot);
                return pivot;
            }
        }
        trace!("left rotation");
        node.right = right.left.take();
        Self::adjust_height(&mut node);
        right.left = Some(node);
        Self::adjust_height(&mut right);
        right
    }

    fn rotate_right(mut node: Box<Node<T>>) -> Box<Node<T>> {
        let mut left = match node.left.take() {
            None => return node,
            Some(left) => left,
        };
        if left.balance < 0 {
            if let Some(mut pivot) = left.right.take() {
                trace!("left-right rotation");
                node.left = pivot.right.take();
                left.right = pivot.left.take();
                Self::adjust_height(&mut node);
                Self::adjust_height(&mut left);
                pivot.left = Some(left);
                pivot.right = Some(node);
                Self::adjust_height(&mut pivot);
                return pivot;
            }
        }
        trace!("right rotation");
        node.left = left.right.take();
        Self::adjust_height(&mut node);
        left.right = Some(node);
        Self::adjust_height(&mut left);
        left
    }

    /// Refreshes height and balance factor of the given node and restores the AVL condition
    /// if necessary. Children must already be balanced with consistent metadata, so the
    /// balance factor never exceeds +2 or -2.
    /// Returns the new subtree root and whether a rotation had been necessary.
    fn rebalance_node(mut node: Box<Node<T>>) -> (Box<Node<T>>, bool) {
        Self::adjust_height(&mut node);
        debug_assert!((-2..=2).contains(&node.balance));
        match node.balance {
            2 => (Self::rotate_right(node), true),
            -2 => (Self::rotate_left(node), true),
            _ => (node, false),
        }
    }

    fn traverse<'a, Pre, In, Post>(
        link: Option<&'a Node<T>>,
        preorder: &mut Pre,
        inorder: &mut In,
        postorder: &mut Post,
    ) where
        Pre: FnMut(&'a Node<T>),
        In: FnMut(&'a Node<T>),
        Post: FnMut(&'a Node<T>),
    {
        if let Some(node) = link {
            preorder(node);
            Self::traverse(node.left.as_deref(), preorder, inorder, postorder);
            inorder(node);
            Self::traverse(node.right.as_deref(), preorder, inorder, postorder);
            postorder(node);
        }
    }

    // Returns the actual height of the subtree, or None for an empty one.
    // Values must lie strictly between the given bounds.
    fn validate_subtree(
        link: Option<&Node<T>>,
        lower: Option<&T>,
        upper: Option<&T>,
        num_nodes: &mut usize,
    ) -> Result<Option<usize>, ConsistencyError> {
        let node = match link {
            None => return Ok(None),
            Some(node) => node,
        };
        let position = *num_nodes;
        *num_nodes += 1;

        if lower.map_or(false, |lower| node.value <= *lower)
            || upper.map_or(false, |upper| node.value >= *upper)
        {
            return Err(ConsistencyError::Unordered { position });
        }

        let left =
            Self::validate_subtree(node.left.as_deref(), lower, Some(&node.value), num_nodes)?;
        let right =
            Self::validate_subtree(node.right.as_deref(), Some(&node.value), upper, num_nodes)?;
        let left_height = left.map_or(0, |height| height + 1);
        let right_height = right.map_or(0, |height| height + 1);

        let height = cmp::max(left_height, right_height);
        if node.height != height {
            return Err(ConsistencyError::HeightMismatch {
                position,
                cached: node.height,
                actual: height,
            });
        }

        let balance_factor = left_height as isize - right_height as isize;
        if node.balance as isize != balance_factor {
            return Err(ConsistencyError::BalanceFactorMismatch {
                position,
                cached: node.balance,
                actual: balance_factor,
            });
        }

        // Check AVL condition (nearly balance)
        if balance_factor.abs() > 1 {
            return Err(ConsistencyError::Unbalanced {
                position,
                balance_factor,
            });
        }

        Ok(Some(height))
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inorder()).finish()
    }
}

impl<T> Node<T> {
    fn create(value: T) -> Box<Self> {
        Box::new(Node {
            value,
            left: None,
            right: None,
            height: 0,
            balance: 0,
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn left(&self) -> Option<&Node<T>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<T>> {
        self.right.as_deref()
    }

    /// Height of the subtree rooted at this node. A leaf has height 0.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height of the left subtree minus height of the right subtree,
    /// counting a missing subtree as height -1.
    pub fn balance_factor(&self) -> i8 {
        self.balance
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("height", &self.height)
            .field("balance_factor", &self.balance)
            .finish()
    }
}
