//! Dense linear algebra over GF(2).
//!
//! [`BitVec`] is a packed vector of bits, [`BitMatrix`] a row-major matrix of bits and
//! [`EchelonForm`] a reduced row echelon form that remembers the row operations it took, so that
//! linear systems can be solved against the original rows.

pub mod bit;
pub use bit::{Bitwise, BitwiseMut, BitwisePair, BitwisePairMut};

pub mod vec;
pub use vec::BitVec;

pub mod matrix;
pub use matrix::{BitMatrix, EchelonForm};

/// Number of bits stored per block of a [`BitVec`].
pub const BLOCK_BIT_LEN: usize = u64::BITS as usize;
