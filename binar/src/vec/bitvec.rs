use crate::{BLOCK_BIT_LEN, Bitwise, BitwiseMut, BitwisePair, BitwisePairMut};
use std::fmt::{Debug, Display, Formatter};
use std::ops::{BitXor, BitXorAssign, Range};
use std::str::FromStr;

/// A fixed length vector of bits packed into 64-bit blocks.
///
/// Bits beyond [`BitVec::len`] are always zero, so equality and hashing only see the
/// logical contents.
///
/// # Example
///
/// ```
/// use binar::{BitVec, Bitwise, BitwiseMut};
///
/// let mut bits = BitVec::zeros(70);
/// bits.assign_index(3, true);
/// bits.assign_index(65, true);
/// assert_eq!(bits.support().collect::<Vec<_>>(), vec![3, 65]);
/// assert_eq!(bits.weight(), 2);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitVec {
    blocks: Vec<u64>,
    length: usize,
}

#[inline]
fn block_count(length: usize) -> usize {
    length.div_ceil(BLOCK_BIT_LEN)
}

impl BitVec {
    #[must_use]
    pub fn zeros(length: usize) -> BitVec {
        BitVec {
            blocks: vec![0; block_count(length)],
            length,
        }
    }

    #[must_use]
    pub fn ones(length: usize) -> BitVec {
        let mut bits = BitVec {
            blocks: vec![u64::MAX; block_count(length)],
            length,
        };
        bits.clear_tail();
        bits
    }

    /// A vector of the given length whose set bits are exactly `support`.
    ///
    /// # Panics
    ///
    /// Panics if an index in `support` is out of range.
    #[must_use]
    pub fn from_support(length: usize, support: impl IntoIterator<Item = usize>) -> BitVec {
        let mut bits = BitVec::zeros(length);
        for index in support {
            bits.assign_index(index, true);
        }
        bits
    }

    /// # Panics
    ///
    /// Panics if `words` holds fewer than `length` bits.
    #[must_use]
    pub fn from_words(length: usize, words: &[u64]) -> BitVec {
        assert!(words.len() * BLOCK_BIT_LEN >= length);
        let mut bits = BitVec {
            blocks: words[..block_count(length)].to_vec(),
            length,
        };
        bits.clear_tail();
        bits
    }

    #[must_use]
    pub fn as_words(&self) -> &[u64] {
        &self.blocks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Iterates over all bits, set or not.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(|index| self.index(index))
    }

    /// Grows or truncates the vector; new bits are zero.
    pub fn resize(&mut self, new_length: usize) {
        self.blocks.resize(block_count(new_length), 0);
        self.length = new_length;
        self.clear_tail();
    }

    /// Copy of the bits in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the vector length.
    #[must_use]
    pub fn extract(&self, range: Range<usize>) -> BitVec {
        assert!(range.end <= self.length);
        BitVec::from_support(
            range.len(),
            self.support()
                .skip_while(|index| *index < range.start)
                .take_while(|index| *index < range.end)
                .map(|index| index - range.start),
        )
    }

    /// Concatenation of `self` followed by `other`.
    #[must_use]
    pub fn concat(&self, other: &BitVec) -> BitVec {
        let mut result = self.clone();
        result.resize(self.length + other.length);
        for index in other.support() {
            result.assign_index(self.length + index, true);
        }
        result
    }

    /// Copy of the bits at the given positions, in the given order.
    #[must_use]
    pub fn selected(&self, positions: &[usize]) -> BitVec {
        positions.iter().map(|position| self.index(*position)).collect()
    }

    fn clear_tail(&mut self) {
        let tail = self.length % BLOCK_BIT_LEN;
        if tail != 0 {
            if let Some(last) = self.blocks.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

impl Bitwise for BitVec {
    #[inline]
    fn index(&self, index: usize) -> bool {
        assert!(index < self.length, "bit index {index} out of range for length {}", self.length);
        (self.blocks[index / BLOCK_BIT_LEN] >> (index % BLOCK_BIT_LEN)) & 1 == 1
    }

    fn support(&self) -> impl Iterator<Item = usize> {
        self.blocks.iter().enumerate().flat_map(|(block_index, block)| {
            let mut remaining = *block;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let offset = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(block_index * BLOCK_BIT_LEN + offset)
            })
        })
    }

    fn weight(&self) -> usize {
        self.blocks.iter().map(|block| block.count_ones() as usize).sum()
    }

    fn is_zero(&self) -> bool {
        self.blocks.iter().all(|block| *block == 0)
    }
}

impl BitwiseMut for BitVec {
    #[inline]
    fn assign_index(&mut self, index: usize, to: bool) {
        assert!(index < self.length, "bit index {index} out of range for length {}", self.length);
        let mask = 1u64 << (index % BLOCK_BIT_LEN);
        if to {
            self.blocks[index / BLOCK_BIT_LEN] |= mask;
        } else {
            self.blocks[index / BLOCK_BIT_LEN] &= !mask;
        }
    }

    #[inline]
    fn negate_index(&mut self, index: usize) {
        assert!(index < self.length, "bit index {index} out of range for length {}", self.length);
        self.blocks[index / BLOCK_BIT_LEN] ^= 1u64 << (index % BLOCK_BIT_LEN);
    }

    fn clear_bits(&mut self) {
        self.blocks.iter_mut().for_each(|block| *block = 0);
    }
}

impl BitwisePair for BitVec {
    fn dot(&self, other: &BitVec) -> bool {
        self.and_weight(other) % 2 == 1
    }

    fn and_weight(&self, other: &BitVec) -> usize {
        self.blocks
            .iter()
            .zip(&other.blocks)
            .map(|(left, right)| (left & right).count_ones() as usize)
            .sum()
    }
}

impl BitwisePairMut for BitVec {
    fn bitxor_assign(&mut self, other: &BitVec) {
        assert_eq!(self.length, other.length, "bit vectors must have equal length");
        for (left, right) in self.blocks.iter_mut().zip(&other.blocks) {
            *left ^= right;
        }
    }
}

impl BitXorAssign<&BitVec> for BitVec {
    fn bitxor_assign(&mut self, other: &BitVec) {
        BitwisePairMut::bitxor_assign(self, other);
    }
}

impl BitXor for &BitVec {
    type Output = BitVec;

    fn bitxor(self, other: &BitVec) -> BitVec {
        let mut result = self.clone();
        result ^= other;
        result
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut bits = BitVec::default();
        for (index, bit) in iter.into_iter().enumerate() {
            if index % BLOCK_BIT_LEN == 0 {
                bits.blocks.push(0);
            }
            if bit {
                bits.blocks[index / BLOCK_BIT_LEN] |= 1u64 << (index % BLOCK_BIT_LEN);
            }
            bits.length = index + 1;
        }
        bits
    }
}

impl Display for BitVec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Debug for BitVec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitVec({self})")
    }
}

impl FromStr for BitVec {
    type Err = String;

    /// Parses a string of `0`, `1`, `.` (zero) and `|` (one) characters, ignoring whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|character| !character.is_whitespace())
            .map(|character| match character {
                '0' | '.' => Ok(false),
                '1' | '|' => Ok(true),
                other => Err(format!("unexpected character '{other}' in bit string")),
            })
            .collect()
    }
}
