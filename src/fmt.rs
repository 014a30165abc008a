//! Formatting implementation for the PrefixTrie

use std::fmt::{Debug, Display, Formatter, Result};

use super::*;

impl Debug for PrefixTrie {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Debug::fmt(&DebugNode(self.root()), f)
    }
}

struct DebugNode<'a>(NodeRef<'a>);

impl Debug for DebugNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let node = self.0;
        match (node.left(), node.right()) {
            (None, None) => Debug::fmt(node.network(), f),
            (Some(child), None) | (None, Some(child)) => f
                .debug_map()
                .entry(node.network(), &DebugNode(child))
                .finish(),
            (Some(left), Some(right)) => f
                .debug_map()
                .entry(node.network(), &(DebugNode(left), DebugNode(right)))
                .finish(),
        }
    }
}

/// One node per line, children indented by two spaces below their parent.
impl Display for PrefixTrie {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut result = Ok(());
        let mut depth = vec![0usize; self.len()];
        self.traverse(|node| {
            let indent = match node.parent() {
                Some(parent) => depth[parent.idx] + 2,
                None => 0,
            };
            depth[node.idx] = indent;
            if result.is_ok() {
                let sep = if node.idx == 0 { "" } else { "\n" };
                result = write!(f, "{sep}{:indent$}{}", "", node.network());
            }
            Walk::Descend
        });
        result
    }
}
