//! Fixed-length bit vectors, stored least significant bit first.

use std::{
    cmp::Ordering,
    fmt,
    ops::{BitAnd, BitOr, Not},
};

use num_traits::{PrimInt, Unsigned};

use crate::{Error, Result};

const WORD_BITS: usize = u64::BITS as usize;

/// An ordered vector of bits with a length fixed at construction. Index `0` is the least
/// significant bit.
///
/// All operators return new vectors. The only in-place modification is [`BitVector::flip`].
///
/// ```
/// # use netblock::BitVector;
/// # fn main() -> Result<(), netblock::Error> {
/// let mask = BitVector::mask(2, 8)?;
/// assert_eq!(mask.to_integer::<u8>(), Some(0b1100_0000));
/// assert_eq!(mask.to_string(), "11000000");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    // bits above `len` in the last word are always zero
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Create a vector of `len` zero bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Binary expansion of `value` into `len` bits. Bits of `value` beyond `len` are dropped,
    /// positions beyond the width of `R` are zero.
    ///
    /// ```
    /// # use netblock::BitVector;
    /// let bits = BitVector::from_integer(6u8, 4);
    /// assert_eq!(bits.to_string(), "0110");
    /// assert_eq!(bits.get(0), Some(false));
    /// assert_eq!(bits.get(1), Some(true));
    /// ```
    pub fn from_integer<R>(value: R, len: usize) -> Self
    where
        R: PrimInt + Unsigned,
    {
        let width = R::zero().count_zeros() as usize;
        (0..len)
            .map(|index| index < width && (value >> index) & R::one() == R::one())
            .collect()
    }

    /// A vector of length `len` whose top `ones` bits are set.
    pub fn mask(ones: usize, len: usize) -> Result<Self> {
        if ones > len {
            return Err(Error::MaskTooLong { ones, len });
        }
        let mut result = Self::new(len);
        for index in (len - ones..len).rev() {
            result.flip(index);
        }
        Ok(result)
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector has no bits at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit at `index`, or `None` if `index` is out of range.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bit(index))
    }

    /// Invert the bit at `index` in place.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn flip(&mut self, index: usize) -> &mut Self {
        assert!(
            index < self.len,
            "bit index {index} out of range for a bit vector of length {}",
            self.len
        );
        self.words[index / WORD_BITS] ^= 1 << (index % WORD_BITS);
        self
    }

    /// Element-wise conjunction.
    pub fn and(&self, other: &Self) -> Result<Self> {
        self.zip_words(other, |a, b| a & b)
    }

    /// Element-wise disjunction.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.zip_words(other, |a, b| a | b)
    }

    /// Append `other`, producing a vector of the combined length. The bits of `other` follow
    /// those of `self`, i.e. they become the more significant bits.
    ///
    /// ```
    /// # use netblock::BitVector;
    /// let low = BitVector::from_integer(0x34u8, 8);
    /// let high = BitVector::from_integer(0x12u8, 8);
    /// assert_eq!(low.concat(&high).to_integer::<u16>(), Some(0x1234));
    /// ```
    pub fn concat(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).collect()
    }

    /// The half-open range `from..to` as a new vector.
    pub fn slice(&self, from: usize, to: usize) -> Result<Self> {
        if from > to || to > self.len {
            return Err(Error::InvalidSlice {
                from,
                to,
                len: self.len,
            });
        }
        Ok((from..to).map(|index| self.bit(index)).collect())
    }

    /// Compare two vectors of equal length as unsigned integers: the first differing bit,
    /// scanning from the most significant end, decides.
    pub fn compare(&self, other: &Self) -> Result<Ordering> {
        self.check_len(other)?;
        Ok(self.words.iter().rev().cmp(other.words.iter().rev()))
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of cleared bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// The integer value of the vector, or `None` if a set bit does not fit into `R`.
    pub fn to_integer<R>(&self) -> Option<R>
    where
        R: PrimInt + Unsigned,
    {
        let width = R::zero().count_zeros() as usize;
        let mut value = R::zero();
        for (index, bit) in self.iter().enumerate() {
            if bit {
                if index >= width {
                    return None;
                }
                value = value | (R::one() << index);
            }
        }
        Some(value)
    }

    /// Format a 32-bit vector as a dotted-quad IPv4 address.
    ///
    /// ```
    /// # use netblock::BitVector;
    /// let bits = BitVector::from_integer(0x0a00_0080u32, 32);
    /// assert_eq!(bits.to_dotted_quad().unwrap(), "10.0.0.128");
    /// assert!(BitVector::new(8).to_dotted_quad().is_err());
    /// ```
    pub fn to_dotted_quad(&self) -> Result<String> {
        if self.len != 32 {
            return Err(Error::NotAnAddress(self.len));
        }
        let octets = [(24, 32), (16, 24), (8, 16), (0, 8)]
            .into_iter()
            .map(|(from, to)| {
                self.slice(from, to)
                    .map(|octet| octet.to_integer::<u8>().unwrap_or_default().to_string())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(octets.join("."))
    }

    /// Iterate over all bits, least significant first.
    pub fn iter(&self) -> Bits<'_> {
        Bits {
            bits: self,
            front: 0,
            back: self.len,
        }
    }

    #[inline(always)]
    fn bit(&self, index: usize) -> bool {
        self.words[index / WORD_BITS] >> (index % WORD_BITS) & 1 == 1
    }

    fn check_len(&self, other: &Self) -> Result<()> {
        if self.len == other.len {
            Ok(())
        } else {
            Err(Error::LengthMismatch {
                left: self.len,
                right: other.len,
            })
        }
    }

    fn zip_words(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Result<Self> {
        self.check_len(other)?;
        Ok(Self {
            words: self
                .words
                .iter()
                .zip(other.words.iter())
                .map(|(a, b)| op(*a, *b))
                .collect(),
            len: self.len,
        })
    }

    fn clear_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1 << used) - 1;
            }
        }
    }
}

/// # Panics
/// If the operands differ in length. Use [`BitVector::and`] for a fallible version.
impl BitAnd for &BitVector {
    type Output = BitVector;

    fn bitand(self, rhs: Self) -> BitVector {
        match self.and(rhs) {
            Ok(result) => result,
            Err(e) => panic!("{e}"),
        }
    }
}

/// # Panics
/// If the operands differ in length. Use [`BitVector::or`] for a fallible version.
impl BitOr for &BitVector {
    type Output = BitVector;

    fn bitor(self, rhs: Self) -> BitVector {
        match self.or(rhs) {
            Ok(result) => result,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Not for &BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        let mut result = BitVector {
            words: self.words.iter().map(|w| !w).collect(),
            len: self.len,
        };
        result.clear_tail();
        result
    }
}

impl Not for BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        !&self
    }
}

/// Vectors of different lengths are unordered.
impl PartialOrd for BitVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl FromIterator<bool> for BitVector {
    /// Collect bits, least significant first.
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut words = Vec::new();
        let mut len = 0;
        for bit in iter {
            if len % WORD_BITS == 0 {
                words.push(0);
            }
            if bit {
                if let Some(last) = words.last_mut() {
                    *last |= 1 << (len % WORD_BITS);
                }
            }
            len += 1;
        }
        Self { words, len }
    }
}

impl<'a> IntoIterator for &'a BitVector {
    type Item = bool;
    type IntoIter = Bits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the bits of a [`BitVector`], least significant first.
#[derive(Clone, Debug)]
pub struct Bits<'a> {
    bits: &'a BitVector,
    front: usize,
    back: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.front < self.back {
            self.front += 1;
            Some(self.bits.bit(self.front - 1))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Bits<'_> {
    fn next_back(&mut self) -> Option<bool> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.bits.bit(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Bits<'_> {}

/// Most significant bit first.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter().rev() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({}): {}", self.len, self)
    }
}
