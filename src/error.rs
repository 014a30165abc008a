//! Error type shared by the bit vector, prefix and trie modules.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or mismatched operands.
    Validation,
    /// A request outside the representable range, such as subdividing a host prefix.
    Range,
    /// An insertion that does not fit the structure of the trie.
    Structural,
}

/// Errors produced while parsing prefixes, combining bit vectors or building a trie.
///
/// Every error is raised before any state is modified, so a failed call leaves its receiver
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The address part is not four dot-separated decimal fields.
    #[error("address `{0}` is not a valid IPv4 address in dotted-decimal form")]
    MalformedAddress(String),
    /// One of the four octets is larger than 255.
    #[error("octet `{octet}` of address `{address}` is out of range 0-255")]
    OctetOutOfRange {
        /// The full dotted-decimal text.
        address: String,
        /// The offending field.
        octet: String,
    },
    /// The mask length is not a decimal number between 0 and 32.
    #[error("mask length `{0}` is not valid for an IPv4 address")]
    InvalidMaskLength(String),
    /// The mask of a prefix is not a run of leading ones.
    #[error("mask {0} is not contiguous")]
    NonContiguousMask(String),
    /// A binary operation was applied to bit vectors of different lengths.
    #[error("bit vectors must have the same length ({left} != {right})")]
    LengthMismatch {
        /// Length of the receiver.
        left: usize,
        /// Length of the argument.
        right: usize,
    },
    /// A slice was requested outside of `0..=len`, or with `from > to`.
    #[error("invalid slice {from}..{to} of a bit vector with length {len}")]
    InvalidSlice {
        /// Inclusive start.
        from: usize,
        /// Exclusive end.
        to: usize,
        /// Length of the sliced vector.
        len: usize,
    },
    /// A mask with more ones than bits was requested.
    #[error("mask cannot have {ones} ones in a bit vector of length {len}")]
    MaskTooLong {
        /// Requested number of ones.
        ones: usize,
        /// Length of the vector.
        len: usize,
    },
    /// A bit vector that is not 32 bits long was formatted as an IPv4 address.
    #[error("a bit vector must have a length of 32 to format as an IPv4 address, got {0}")]
    NotAnAddress(usize),
    /// The children of a `/32` prefix were requested.
    #[error("cannot subdivide host prefix {0}")]
    HostPrefix(String),
    /// A prefix was inserted into a trie whose root does not contain it.
    #[error("cannot insert {prefix}: it is not a subnet of {network}")]
    NotASubnet {
        /// The root network of the trie.
        network: String,
        /// The rejected prefix.
        prefix: String,
    },
}

impl Error {
    /// Classify the error.
    ///
    /// ```
    /// # use netblock::{ErrorKind, Prefix};
    /// let err = "10.0.0.300/8".parse::<Prefix>().unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Validation);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedAddress(_)
            | Error::OctetOutOfRange { .. }
            | Error::InvalidMaskLength(_)
            | Error::NonContiguousMask(_)
            | Error::LengthMismatch { .. }
            | Error::InvalidSlice { .. } => ErrorKind::Validation,
            Error::MaskTooLong { .. } | Error::NotAnAddress(_) | Error::HostPrefix(_) => {
                ErrorKind::Range
            }
            Error::NotASubnet { .. } => ErrorKind::Structural,
        }
    }
}
