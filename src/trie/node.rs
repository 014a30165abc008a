//! Nodes of the trie and a read-only view into them.

use crate::{Prefix, PrefixTrie};

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) network: Prefix,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    /// Set for nodes that were attached by an insertion, as opposed to intermediate nodes.
    pub(crate) allocated: bool,
}

/// Tells [`PrefixTrie::traverse`] how to continue after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Continue into the children of the current node.
    Descend,
    /// Do not visit the children of the current node. The rest of the traversal continues.
    Skip,
}

/// A read-only handle to a node of a [`PrefixTrie`], representing the subtree rooted at it.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) trie: &'a PrefixTrie,
    pub(crate) idx: usize,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRef").field(self.network()).finish()
    }
}

impl<'a> NodeRef<'a> {
    #[inline(always)]
    fn node(&self) -> &'a Node {
        &self.trie.table[self.idx]
    }

    #[inline(always)]
    fn at(&self, idx: usize) -> NodeRef<'a> {
        NodeRef {
            trie: self.trie,
            idx,
        }
    }

    /// The network this node represents.
    pub fn network(&self) -> &'a Prefix {
        &self.node().network
    }

    /// The parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|idx| self.at(idx))
    }

    /// The child covering the lower half of this network.
    pub fn left(&self) -> Option<NodeRef<'a>> {
        self.node().left.map(|idx| self.at(idx))
    }

    /// The child covering the upper half of this network.
    pub fn right(&self) -> Option<NodeRef<'a>> {
        self.node().right.map(|idx| self.at(idx))
    }

    /// Whether this node was attached by an insertion rather than created on the way down.
    pub fn is_allocated(&self) -> bool {
        self.node().allocated
    }

    /// Whether this node has no children, i.e., represents a fully allocated block.
    pub fn is_leaf(&self) -> bool {
        self.node().left.is_none() && self.node().right.is_none()
    }

    /// Whether this node has both children.
    pub fn is_full(&self) -> bool {
        self.node().left.is_some() && self.node().right.is_some()
    }

    /// Whether this node, or any of its descendants, has exactly one child. A leaf is never
    /// sparse.
    pub fn is_sparse(&self) -> bool {
        match (self.left(), self.right()) {
            (None, None) => false,
            (Some(left), Some(right)) => left.is_sparse() || right.is_sparse(),
            _ => true,
        }
    }

    /// The network of the missing child, if this node has exactly one child.
    pub fn unallocated(&self) -> Option<Prefix> {
        match (self.node().left, self.node().right) {
            (None, Some(_)) => self.network().left_child().ok(),
            (Some(_), None) => self.network().right_child().ok(),
            _ => None,
        }
    }

    /// Visit this node and its descendants in pre-order: the node itself, then the left
    /// subtree, then the right subtree. Returning [`Walk::Skip`] from `visit` prunes the
    /// children of the visited node only.
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(NodeRef<'a>) -> Walk,
    {
        let mut stack = vec![self.idx];
        while let Some(idx) = stack.pop() {
            if visit(self.at(idx)) == Walk::Skip {
                continue;
            }
            let node = &self.trie.table[idx];
            stack.extend(node.right);
            stack.extend(node.left);
        }
    }
}
