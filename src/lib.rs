//! This crate organizes IPv4 prefixes of an allocation table into a binary prefix trie. On top
//! of the trie, it answers three questions:
//!
//! - [`PrefixTrie::aggregate`]: the fewest, largest prefixes that exactly cover the contiguous
//!   allocated blocks (CIDR supernetting).
//! - [`PrefixTrie::holes`]: the unallocated blocks within the root prefix.
//! - [`PrefixTrie::next`]: the lowest-addressed free prefix of a given length within each hole.
//!
//! ```
//! # use netblock::*;
//! # fn main() -> Result<()> {
//! let mut trie = PrefixTrie::from_cidr("10.0.0.0/24")?;
//! trie.insert("10.0.0.0/25".parse()?)?;
//! assert_eq!(trie.aggregate(), vec!["10.0.0.0/25".parse::<Prefix>()?]);
//! assert_eq!(trie.holes(), vec!["10.0.0.128/25".parse::<Prefix>()?]);
//! assert_eq!(trie.next(26)?, vec!["10.0.0.128/26".parse::<Prefix>()?]);
//! # Ok(())
//! # }
//! ```
//!
//! # Description of the Tree
//!
//! Every node of the tree holds a network prefix. The children of a node are exactly the lower
//! and the upper half of its network, so the depth of a node equals its prefix length relative
//! to the root. When inserting a prefix, we look at the most significant bit that is **not**
//! part of the current node's prefix. If it is not set, we take the left branch, and otherwise,
//! the right one. Missing intermediate nodes are created on the way down. A node without
//! children is a fully allocated block.
//!
//! A subtree is *sparse* if any of its nodes has exactly one child. Non-sparse subtrees are
//! complete and can be aggregated into their root. The missing sibling of a node with one child
//! is a hole.
//!
//! # Traversals
//!
//! All queries are built on [`PrefixTrie::traverse`], a pre-order walk in which the visitor may
//! skip the children of the current node without aborting the walk. Results are therefore
//! yielded in lexicographic order.
//!
//! # Features
//!
//! - `ipnet` (default): conversions between [`Prefix`] and `ipnet::Ipv4Net`.
//! - `serde`: (de)serialization of prefixes, tries and [`table::AllocationTable`].
//! - `yaml`: reading allocation tables from YAML.
//! - `cli` (default): the `nb` command line tool.

#![deny(missing_docs)]

mod bitvec;
mod error;
mod fmt;
mod prefix;
#[cfg(feature = "serde")]
mod serde;

#[cfg(test)]
mod fuzzing;

#[cfg(feature = "serde")]
pub mod table;
pub mod trie;

pub use bitvec::{BitVector, Bits};
pub use error::{Error, ErrorKind, Result};
pub use prefix::{Annotation, Metadata, Prefix, ADDRESS_BITS};
pub use trie::{NodeRef, PrefixTrie, Walk};

/// Whether `child` lies in the upper half of `branch`, i.e., whether the first bit of `child`
/// beyond the prefix of `branch` is set.
#[inline(always)]
pub(crate) fn to_right(branch: &Prefix, child: &Prefix) -> bool {
    ADDRESS_BITS
        .checked_sub(1 + usize::from(branch.prefix_len()))
        .and_then(|bit| child.value().get(bit))
        .unwrap_or(false)
}
