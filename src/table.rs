//! Allocation tables: a root network together with the prefixes allocated within it.
//!
//! In YAML, a table looks as follows. Every key of a subnet besides `address` is kept as
//! metadata of the prefix.
//!
//! ```yaml
//! root: 10.0.0.0/16
//! subnets:
//!   - address: 10.0.0.0/24
//!     name: office
//!     vlan: 10
//!   - 10.0.1.0/24
//! ```

#[cfg(feature = "yaml")]
use std::path::{Path, PathBuf};

use ::serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{Prefix, PrefixTrie};

/// Errors while loading an allocation table or building its trie.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table could not be read.
    #[cfg(feature = "yaml")]
    #[error("cannot read allocation table {}: {source}", path.display())]
    Io {
        /// Path of the table.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The table is not valid YAML, or does not have the expected shape.
    #[cfg(feature = "yaml")]
    #[error("invalid allocation table: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A subnet could not be inserted into the trie.
    #[error("cannot allocate subnet #{index} ({prefix}): {source}")]
    Subnet {
        /// Position of the subnet in the table.
        index: usize,
        /// The subnet in CIDR notation.
        prefix: String,
        /// Underlying error.
        #[source]
        source: crate::Error,
    },
}

/// A root network and the prefixes allocated within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationTable {
    /// The network that contains all subnets.
    pub root: Prefix,
    /// Allocated prefixes, in the order they are inserted.
    #[serde(default)]
    pub subnets: Vec<Prefix>,
}

impl AllocationTable {
    /// Create a table without any subnets.
    pub fn new(root: Prefix) -> Self {
        Self {
            root,
            subnets: Vec::new(),
        }
    }

    /// Build the trie by inserting all subnets in order. Fails on the first subnet that is not
    /// contained in the root.
    pub fn into_trie(self) -> Result<PrefixTrie, TableError> {
        let mut trie = PrefixTrie::new(self.root);
        let total = self.subnets.len();
        for (index, prefix) in self.subnets.into_iter().enumerate() {
            let cidr = prefix.cidr();
            trie.insert(prefix).map_err(|source| TableError::Subnet {
                index,
                prefix: cidr,
                source,
            })?;
        }
        debug!(root = %trie.network(), subnets = total, nodes = trie.len(), "built trie");
        Ok(trie)
    }

    /// Parse a table from YAML text.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self, TableError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a table from a YAML file.
    #[cfg(feature = "yaml")]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading allocation table");
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Render the table as YAML.
    #[cfg(feature = "yaml")]
    pub fn to_yaml_string(&self) -> Result<String, TableError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl From<&PrefixTrie> for AllocationTable {
    /// The root and all allocated prefixes of the trie, in address order.
    fn from(trie: &PrefixTrie) -> Self {
        Self {
            root: trie.network().clone(),
            subnets: trie.allocations().into_iter().cloned().collect(),
        }
    }
}
