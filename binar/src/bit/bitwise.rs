/// Read access to a sequence of bits.
pub trait Bitwise {
    fn index(&self, index: usize) -> bool;

    /// Indices of the set bits in increasing order.
    fn support(&self) -> impl Iterator<Item = usize>;

    #[inline]
    fn min_support(&self) -> Option<usize> {
        self.support().next()
    }

    #[inline]
    fn weight(&self) -> usize {
        self.support().count()
    }

    #[inline]
    fn parity(&self) -> bool {
        self.weight() % 2 == 1
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.support().next().is_none()
    }
}

pub trait BitwiseMut: Bitwise {
    fn assign_index(&mut self, index: usize, to: bool);
    fn negate_index(&mut self, index: usize);
    fn clear_bits(&mut self);
}

/// Products of two bit sequences of the same length.
pub trait BitwisePair<Other: ?Sized = Self> {
    /// Inner product over GF(2).
    fn dot(&self, other: &Other) -> bool;
    fn and_weight(&self, other: &Other) -> usize;
}

pub trait BitwisePairMut<Other: ?Sized = Self>: BitwiseMut + BitwisePair<Other> {
    /// Adds `other` in place.
    fn bitxor_assign(&mut self, other: &Other);
}
