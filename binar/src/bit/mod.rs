mod bitwise;

pub use bitwise::{Bitwise, BitwiseMut, BitwisePair, BitwisePairMut};
