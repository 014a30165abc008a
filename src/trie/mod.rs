//! Implementation of the prefix trie.

use tracing::{debug, trace};

use crate::{to_right, Error, Prefix, Result, ADDRESS_BITS};

mod node;

pub(crate) use node::Node;
pub use node::{NodeRef, Walk};

/// A binary tree of IPv4 prefixes rooted at a fixed network.
///
/// Nodes are stored in a table and refer to their children and their parent by index. Nodes
/// are only ever added, so every child is stored after its parent.
#[derive(Clone)]
pub struct PrefixTrie {
    pub(crate) table: Vec<Node>,
}

impl Default for PrefixTrie {
    /// A trie rooted at `0.0.0.0/0`.
    fn default() -> Self {
        Self::new(Prefix::root())
    }
}

impl PrefixTrie {
    /// Create a trie without any allocations below `root`. Host bits of `root` are cleared.
    pub fn new(root: Prefix) -> Self {
        Self {
            table: vec![Node {
                network: root.into_network(),
                parent: None,
                left: None,
                right: None,
                allocated: false,
            }],
        }
    }

    /// Create an empty trie from a root prefix in CIDR notation.
    pub fn from_cidr(root: &str) -> Result<Self> {
        Ok(Self::new(root.parse()?))
    }

    /// Create a trie and insert all `prefixes`, stopping at the first error.
    ///
    /// ```
    /// # use netblock::*;
    /// # fn main() -> Result<()> {
    /// let trie = PrefixTrie::from_prefixes(
    ///     "10.0.0.0/24".parse()?,
    ///     ["10.0.0.0/25".parse()?, "10.0.0.128/25".parse()?],
    /// )?;
    /// assert_eq!(trie.aggregate(), vec!["10.0.0.0/24".parse::<Prefix>()?]);
    /// assert!(trie.holes().is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_prefixes<I>(root: Prefix, prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Prefix>,
    {
        let mut trie = Self::new(root);
        for prefix in prefixes {
            trie.insert(prefix)?;
        }
        Ok(trie)
    }

    /// The root of the trie.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            trie: self,
            idx: 0,
        }
    }

    /// The root network.
    pub fn network(&self) -> &Prefix {
        &self.table[0].network
    }

    /// Number of nodes, including the root and intermediate nodes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether nothing was inserted below the root.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 1
    }

    /// Insert `prefix` below the root. Host bits of `prefix` are cleared first.
    ///
    /// Fails if `prefix` is neither the root network nor contained in it; the trie is left
    /// unchanged in that case. If `prefix` already has a node (the root, an intermediate node
    /// or an earlier allocation), that node is never replaced, so structure built below it is
    /// preserved. It is only marked as allocated, and takes over the metadata of `prefix` if
    /// it has none yet. Returns whether a new node for `prefix` was attached.
    ///
    /// ```
    /// # use netblock::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = PrefixTrie::from_cidr("10.0.0.0/8")?;
    /// assert!(trie.insert("10.1.0.0/16".parse()?)?);
    /// assert!(!trie.insert("10.1.0.0/16".parse()?)?);
    /// assert!(!trie.insert("10.0.0.0/8".parse()?)?);
    /// let err = trie.insert("192.168.1.0/24".parse()?).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Structural);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: Prefix) -> Result<bool> {
        let root = self.network();
        if !root.is_subnet(&prefix) && *root != prefix.network() {
            return Err(Error::NotASubnet {
                network: root.cidr(),
                prefix: prefix.cidr(),
            });
        }
        let prefix = prefix.into_network();

        let mut idx = 0;
        loop {
            let network = &self.table[idx].network;
            if *network == prefix {
                self.allocate_existing(idx, prefix);
                return Ok(false);
            }
            let right = to_right(network, &prefix);
            let child = if right {
                network.right_child()?
            } else {
                network.left_child()?
            };
            trace!(%network, %child, "descend");
            match self.get_child(idx, right) {
                Some(existing) if child == prefix => {
                    self.allocate_existing(existing, prefix);
                    return Ok(false);
                }
                None if child == prefix => {
                    self.new_node(idx, prefix, right, true);
                    return Ok(true);
                }
                Some(next) => idx = next,
                None => idx = self.new_node(idx, child, right, false),
            }
        }
    }

    /// Find the node representing exactly `prefix`.
    pub fn find(&self, prefix: &Prefix) -> Option<NodeRef<'_>> {
        let mut idx = 0;
        loop {
            let network = &self.table[idx].network;
            if network == prefix {
                return Some(NodeRef { trie: self, idx });
            }
            if !network.is_subnet(prefix) {
                return None;
            }
            idx = self.get_child(idx, to_right(network, prefix))?;
        }
    }

    /// Visit every node in pre-order, see [`NodeRef::traverse`].
    ///
    /// ```
    /// # use netblock::*;
    /// # fn main() -> Result<()> {
    /// let mut trie = PrefixTrie::from_cidr("10.0.0.0/24")?;
    /// trie.insert("10.0.0.0/26".parse()?)?;
    /// trie.insert("10.0.0.128/25".parse()?)?;
    /// let mut visited = Vec::new();
    /// trie.traverse(|node| {
    ///     visited.push(node.network().to_string());
    ///     if node.network().prefix_len() < 25 { Walk::Descend } else { Walk::Skip }
    /// });
    /// assert_eq!(visited, ["10.0.0.0/24", "10.0.0.0/25", "10.0.0.128/25"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn traverse<'a, F>(&'a self, visit: F)
    where
        F: FnMut(NodeRef<'a>) -> Walk,
    {
        self.root().traverse(visit)
    }

    /// The least-specific prefixes covering each contiguous block of allocations: every node
    /// whose subtree is complete (all nodes have zero or two children) and whose parent's
    /// subtree is not. The result is in address order.
    ///
    /// A trie without any insertion consists of the root as a single leaf, and aggregates to
    /// the root itself.
    pub fn aggregate(&self) -> Vec<Prefix> {
        let sparse = self.sparse_table();
        let mut aggregates = Vec::new();
        self.traverse(|node| {
            if sparse[node.idx] {
                Walk::Descend
            } else {
                aggregates.push(node.network().clone());
                Walk::Skip
            }
        });
        aggregates
    }

    /// The unallocated blocks below the root: the missing sibling of every node that has
    /// exactly one child. The result is in pre-order, not sorted by address.
    pub fn holes(&self) -> Vec<Prefix> {
        let sparse = self.sparse_table();
        let mut holes = Vec::new();
        self.traverse(|node| {
            if !sparse[node.idx] {
                return Walk::Skip;
            }
            if let Some(hole) = node.unallocated() {
                holes.push(hole);
            }
            Walk::Descend
        });
        holes
    }

    /// For every hole that can hold a prefix of length `len`, the lowest-addressed prefix of
    /// that length within it, in ascending address order.
    pub fn next(&self, len: u8) -> Result<Vec<Prefix>> {
        if usize::from(len) > ADDRESS_BITS {
            return Err(Error::InvalidMaskLength(len.to_string()));
        }
        let mut suitable: Vec<Prefix> = self
            .holes()
            .into_iter()
            .filter(|hole| hole.prefix_len() <= len)
            .collect();
        suitable.sort();
        suitable
            .into_iter()
            .map(|mut block| {
                while block.prefix_len() < len {
                    block = block.left_child()?;
                }
                Ok(block)
            })
            .collect()
    }

    /// The networks of all leaves, in address order.
    pub fn flatten(&self) -> Vec<Prefix> {
        let mut leaves = Vec::new();
        self.traverse(|node| {
            if node.is_leaf() {
                leaves.push(node.network().clone());
            }
            Walk::Descend
        });
        leaves
    }

    /// All prefixes that were attached by [`PrefixTrie::insert`], in address order.
    pub fn allocations(&self) -> Vec<&Prefix> {
        let mut allocated = Vec::new();
        self.traverse(|node| {
            if node.is_allocated() {
                allocated.push(node.network());
            }
            Walk::Descend
        });
        allocated
    }

    /// `is_sparse` for every node, computed bottom-up in one pass.
    pub(crate) fn sparse_table(&self) -> Vec<bool> {
        let mut sparse = vec![false; self.table.len()];
        // children are always stored after their parent
        for idx in (0..self.table.len()).rev() {
            let node = &self.table[idx];
            sparse[idx] = match (node.left, node.right) {
                (None, None) => false,
                (Some(left), Some(right)) => sparse[left] || sparse[right],
                _ => true,
            };
        }
        sparse
    }

    /// Mark the node at `idx`, which already represents `prefix`, as allocated.
    fn allocate_existing(&mut self, idx: usize, mut prefix: Prefix) {
        debug!(%prefix, "prefix is already part of the trie");
        let node = &mut self.table[idx];
        node.allocated = true;
        let metadata = node.network.metadata_mut();
        if metadata.is_empty() {
            *metadata = std::mem::take(prefix.metadata_mut());
        }
    }

    #[inline(always)]
    fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right
        } else {
            self.table[idx].left
        }
    }

    /// Append a new node as the child of `parent` and return its index.
    fn new_node(&mut self, parent: usize, network: Prefix, right: bool, allocated: bool) -> usize {
        let idx = self.table.len();
        self.table.push(Node {
            network,
            parent: Some(parent),
            left: None,
            right: None,
            allocated,
        });
        if right {
            self.table[parent].right = Some(idx);
        } else {
            self.table[parent].left = Some(idx);
        }
        idx
    }
}
