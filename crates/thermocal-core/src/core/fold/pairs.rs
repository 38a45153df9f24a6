use crate::core::models::sequence::Nucleotide;

/// Canonical and wobble base pairs, named 5' base first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairType {
    CG,
    GC,
    GU,
    UG,
    AU,
    UA,
}

impl PairType {
    pub fn of(five_prime: Nucleotide, three_prime: Nucleotide) -> Option<Self> {
        use Nucleotide::*;
        match (five_prime, three_prime) {
            (C, G) => Some(Self::CG),
            (G, C) => Some(Self::GC),
            (G, U) => Some(Self::GU),
            (U, G) => Some(Self::UG),
            (A, U) => Some(Self::AU),
            (U, A) => Some(Self::UA),
            _ => None,
        }
    }

    /// Row/column index into the pair-indexed energy tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::CG => 0,
            Self::GC => 1,
            Self::GU => 2,
            Self::UG => 3,
            Self::AU => 4,
            Self::UA => 5,
        }
    }

    #[inline]
    pub fn is_wobble(self) -> bool {
        matches!(self, Self::GU | Self::UG)
    }

    /// AU and GU helix ends carry the terminal penalty.
    #[inline]
    pub fn is_weak(self) -> bool {
        !matches!(self, Self::CG | Self::GC)
    }

    /// The same pair read from the other strand.
    pub fn reversed(self) -> Self {
        match self {
            Self::CG => Self::GC,
            Self::GC => Self::CG,
            Self::GU => Self::UG,
            Self::UG => Self::GU,
            Self::AU => Self::UA,
            Self::UA => Self::AU,
        }
    }
}
