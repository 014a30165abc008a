//! IPv4 network prefixes, represented as a pair of 32-bit [`BitVector`]s.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    net::Ipv4Addr,
    str::FromStr,
};

#[cfg(feature = "ipnet")]
use ipnet::Ipv4Net;

use crate::{BitVector, Error, Result};

/// Number of bits in an IPv4 address.
pub const ADDRESS_BITS: usize = 32;

/// A scalar annotation attached to a [`Prefix`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(::serde::Serialize, ::serde::Deserialize),
    serde(untagged)
)]
pub enum Annotation {
    /// `true` or `false`
    Bool(bool),
    /// A signed integer
    Integer(i64),
    /// A floating point number
    Float(f64),
    /// Free text
    Text(String),
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Bool(b) => b.fmt(f),
            Annotation::Integer(i) => i.fmt(f),
            Annotation::Float(x) => x.fmt(f),
            Annotation::Text(s) => s.fmt(f),
        }
    }
}

impl From<bool> for Annotation {
    fn from(value: bool) -> Self {
        Annotation::Bool(value)
    }
}

impl From<i64> for Annotation {
    fn from(value: i64) -> Self {
        Annotation::Integer(value)
    }
}

impl From<f64> for Annotation {
    fn from(value: f64) -> Self {
        Annotation::Float(value)
    }
}

impl From<&str> for Annotation {
    fn from(value: &str) -> Self {
        Annotation::Text(value.to_string())
    }
}

impl From<String> for Annotation {
    fn from(value: String) -> Self {
        Annotation::Text(value)
    }
}

/// Annotations of a prefix. They are carried along for display and never consulted by any
/// trie algorithm.
pub type Metadata = BTreeMap<String, Annotation>;

/// An IPv4 network prefix: a 32-bit address and a mask of leading ones.
///
/// Two prefixes are equal if they have the same address bits and the same prefix length;
/// metadata is ignored. Prefixes are ordered by address, ties broken by prefix length.
///
/// ```
/// # use netblock::Prefix;
/// # fn main() -> Result<(), netblock::Error> {
/// let p: Prefix = "10.0.0.0/24".parse()?;
/// assert_eq!(p.prefix_len(), 24);
/// assert_eq!(p.left_child()?.to_string(), "10.0.0.0/25");
/// assert_eq!(p.right_child()?.to_string(), "10.0.0.128/25");
/// assert_eq!(p.parent().unwrap().to_string(), "10.0.0.0/23");
/// assert!(p.is_subnet(&"10.0.0.64/26".parse()?));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Prefix {
    value: BitVector,
    mask: BitVector,
    metadata: Metadata,
}

impl Prefix {
    /// Create a prefix from its address and mask bits. Both must be [`ADDRESS_BITS`] long, and
    /// the mask must consist of leading ones only.
    pub fn new(value: BitVector, mask: BitVector) -> Result<Self> {
        for bits in [&value, &mask] {
            if bits.len() != ADDRESS_BITS {
                return Err(Error::LengthMismatch {
                    left: ADDRESS_BITS,
                    right: bits.len(),
                });
            }
        }
        if BitVector::mask(mask.count_ones(), ADDRESS_BITS)? != mask {
            return Err(Error::NonContiguousMask(mask.to_string()));
        }
        Ok(Self::from_parts(value, mask))
    }

    /// Parse a prefix in CIDR notation `A.B.C.D/N`. The mask length is optional and defaults
    /// to 32.
    ///
    /// ```
    /// # use netblock::{Error, Prefix};
    /// assert_eq!(Prefix::from_cidr("10.1.2.3").unwrap().prefix_len(), 32);
    /// assert!(matches!(Prefix::from_cidr("10.1.2/8"), Err(Error::MalformedAddress(_))));
    /// assert!(matches!(Prefix::from_cidr("10.1.2.256/8"), Err(Error::OctetOutOfRange { .. })));
    /// assert!(matches!(Prefix::from_cidr("10.1.2.3/33"), Err(Error::InvalidMaskLength(_))));
    /// ```
    pub fn from_cidr(text: &str) -> Result<Self> {
        let text = text.trim();
        let (dotted, len) = match text.split_once('/') {
            Some((dotted, len)) => (dotted, parse_mask_len(len)?),
            None => (text, ADDRESS_BITS),
        };

        let fields: Vec<&str> = dotted.split('.').collect();
        if fields.len() != 4 || !fields.iter().all(|field| is_decimal(field)) {
            return Err(Error::MalformedAddress(dotted.to_string()));
        }
        let octets = fields
            .iter()
            .map(|field| {
                field.parse::<u8>().map_err(|_| Error::OctetOutOfRange {
                    address: dotted.to_string(),
                    octet: field.to_string(),
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        // the last octet holds the least significant bits
        let value = octets
            .iter()
            .rev()
            .map(|octet| BitVector::from_integer(*octet, 8))
            .reduce(|low, high| low.concat(&high))
            .unwrap_or_else(|| BitVector::new(ADDRESS_BITS));

        Ok(Self::from_parts(value, BitVector::mask(len, ADDRESS_BITS)?))
    }

    /// Create a prefix from an address and a prefix length.
    pub fn from_addr(addr: Ipv4Addr, len: u8) -> Result<Self> {
        if usize::from(len) > ADDRESS_BITS {
            return Err(Error::InvalidMaskLength(len.to_string()));
        }
        Ok(Self::from_parts(
            BitVector::from_integer(u32::from(addr), ADDRESS_BITS),
            BitVector::mask(len.into(), ADDRESS_BITS)?,
        ))
    }

    /// The prefix `0.0.0.0/0` that contains every address.
    pub fn root() -> Self {
        Self::from_parts(BitVector::new(ADDRESS_BITS), BitVector::new(ADDRESS_BITS))
    }

    pub(crate) fn from_parts(value: BitVector, mask: BitVector) -> Self {
        Self {
            value,
            mask,
            metadata: Metadata::new(),
        }
    }

    /// Replace the metadata of this prefix.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a single annotation.
    ///
    /// ```
    /// # use netblock::Prefix;
    /// let p = Prefix::from_cidr("10.0.0.0/24").unwrap().annotate("vpc", "prod");
    /// assert_eq!(p.to_string(), "10.0.0.0/24 vpc: prod");
    /// ```
    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<Annotation>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The annotations of this prefix.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// The address bits.
    pub fn value(&self) -> &BitVector {
        &self.value
    }

    /// The mask bits.
    pub fn mask(&self) -> &BitVector {
        &self.mask
    }

    /// The prefix length, i.e., the number of ones in the mask.
    pub fn prefix_len(&self) -> u8 {
        self.mask.count_ones() as u8
    }

    /// The address of this prefix, including any host bits.
    pub fn addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.value.to_integer::<u32>().unwrap_or_default())
    }

    /// Number of addresses covered by this prefix.
    pub fn num_addresses(&self) -> u64 {
        1 << (ADDRESS_BITS - usize::from(self.prefix_len()))
    }

    /// The prefix with all host bits cleared.
    pub fn network(&self) -> Self {
        Self::from_parts(&self.value & &self.mask, self.mask.clone())
    }

    /// Like [`Prefix::network`], but keeps the metadata.
    pub fn into_network(self) -> Self {
        let value = &self.value & &self.mask;
        Self { value, ..self }
    }

    /// The prefix with all host bits set.
    pub fn broadcast(&self) -> Self {
        Self::from_parts(&self.value | &!&self.mask, self.mask.clone())
    }

    /// Whether no host bits are set.
    pub fn is_network(&self) -> bool {
        &self.value & &self.mask == self.value
    }

    /// The super-block of this prefix. For a prefix with host bits set, this is its
    /// [`Prefix::network`]. For a network prefix, it is the network one bit shorter. The root
    /// `0.0.0.0/0` has no parent.
    ///
    /// ```
    /// # use netblock::Prefix;
    /// let p = Prefix::from_cidr("10.0.0.5/24").unwrap();
    /// assert_eq!(p.parent().unwrap().to_string(), "10.0.0.0/24");
    /// assert_eq!(p.network().parent().unwrap().to_string(), "10.0.0.0/23");
    /// assert!(Prefix::root().parent().is_none());
    /// ```
    pub fn parent(&self) -> Option<Self> {
        if !self.is_network() {
            return Some(self.network());
        }
        let len = usize::from(self.prefix_len());
        if len == 0 {
            return None;
        }
        let mut supermask = self.mask.clone();
        supermask.flip(ADDRESS_BITS - len);
        Some(Self::from_parts(&self.value & &supermask, supermask))
    }

    /// The lower half of this network, one bit longer.
    pub fn left_child(&self) -> Result<Self> {
        let submask = self.submask()?;
        Ok(Self::from_parts(self.network().value, submask))
    }

    /// The upper half of this network, one bit longer.
    pub fn right_child(&self) -> Result<Self> {
        let submask = self.submask()?;
        let mut value = self.network().value;
        value.flip(ADDRESS_BITS - 1 - usize::from(self.prefix_len()));
        Ok(Self::from_parts(value, submask))
    }

    /// Both halves of this network.
    pub fn children(&self) -> Result<(Self, Self)> {
        Ok((self.left_child()?, self.right_child()?))
    }

    fn submask(&self) -> Result<BitVector> {
        let len = usize::from(self.prefix_len());
        if len == ADDRESS_BITS {
            return Err(Error::HostPrefix(self.cidr()));
        }
        let mut submask = self.mask.clone();
        submask.flip(ADDRESS_BITS - 1 - len);
        Ok(submask)
    }

    /// Whether `other` is strictly more specific than `self` and lies within it.
    ///
    /// ```
    /// # use netblock::Prefix;
    /// let net = Prefix::from_cidr("10.0.0.0/8").unwrap();
    /// assert!(net.is_subnet(&Prefix::from_cidr("10.20.0.0/16").unwrap()));
    /// assert!(!net.is_subnet(&net));
    /// assert!(!net.is_subnet(&Prefix::from_cidr("11.0.0.0/16").unwrap()));
    /// ```
    pub fn is_subnet(&self, other: &Self) -> bool {
        other.prefix_len() > self.prefix_len() && &self.mask & &other.value == self.value
    }

    /// The prefix in CIDR notation, without metadata.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.addr(), self.prefix_len())
    }
}

fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_mask_len(text: &str) -> Result<usize> {
    if is_decimal(text) {
        if let Ok(len) = text.parse::<usize>() {
            if len <= ADDRESS_BITS {
                return Ok(len);
            }
        }
    }
    Err(Error::InvalidMaskLength(text.to_string()))
}

impl Default for Prefix {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for Prefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_cidr(s)
    }
}

impl PartialEq for Prefix {
    fn eq(&self, other: &Self) -> bool {
        self.prefix_len() == other.prefix_len() && self.value == other.value
    }
}

impl Eq for Prefix {}

impl Hash for Prefix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.prefix_len().hash(state);
    }
}

impl PartialOrd for Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .compare(&other.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.prefix_len().cmp(&other.prefix_len()))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted = self.value.to_dotted_quad().map_err(|_| fmt::Error)?;
        write!(f, "{dotted}/{}", self.prefix_len())?;
        for (i, (key, value)) in self.metadata.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(feature = "ipnet")]
impl From<Ipv4Net> for Prefix {
    fn from(net: Ipv4Net) -> Self {
        Self::from_parts(
            BitVector::from_integer(u32::from(net.addr()), ADDRESS_BITS),
            BitVector::from_integer(u32::from(net.netmask()), ADDRESS_BITS),
        )
    }
}

#[cfg(feature = "ipnet")]
impl From<&Prefix> for Ipv4Net {
    fn from(prefix: &Prefix) -> Self {
        Ipv4Net::new(prefix.addr(), prefix.prefix_len()).expect("prefix length is at most 32")
    }
}
