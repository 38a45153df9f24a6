use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SequenceError {
    #[error("Sequence is empty")]
    Empty,

    #[error("Invalid nucleotide symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
}

/// One of the four RNA bases, or `N` for an ambiguous base that never pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    C,
    G,
    U,
    N,
}

impl Nucleotide {
    /// Parses an upper-case RNA symbol. `T` is accepted as an alias of `U`, and the IUPAC
    /// ambiguity codes all map to `N`.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'A' => Some(Self::A),
            'C' => Some(Self::C),
            'G' => Some(Self::G),
            'U' | 'T' => Some(Self::U),
            'N' | 'R' | 'Y' | 'S' | 'W' | 'K' | 'M' | 'B' | 'D' | 'H' | 'V' => Some(Self::N),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::U => 'U',
            Self::N => 'N',
        }
    }

    /// Column index used by the per-base energy tables; `None` for `N`, which has no entry.
    #[inline]
    pub(crate) fn index(self) -> Option<usize> {
        match self {
            Self::A => Some(0),
            Self::C => Some(1),
            Self::G => Some(2),
            Self::U => Some(3),
            Self::N => None,
        }
    }
}

/// An immutable, normalized RNA sequence.
///
/// Folding always operates on the RNA alphabet. The displayed symbols keep a `T` when DNA
/// conversion is switched off, and ambiguity codes are always shown as given, so that
/// output lines echo the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    nucleotides: Vec<Nucleotide>,
    symbols: Vec<char>,
}

impl Sequence {
    /// Upper-cases `raw` and converts DNA `T` to `U`.
    pub fn new(raw: &str) -> Result<Self, SequenceError> {
        Self::with_conversion(raw, true)
    }

    pub fn with_conversion(raw: &str, convert_dna: bool) -> Result<Self, SequenceError> {
        let mut nucleotides = Vec::with_capacity(raw.len());
        let mut symbols = Vec::with_capacity(raw.len());

        for (idx, c) in raw.trim().chars().enumerate() {
            let upper = c.to_ascii_uppercase();
            let nucleotide =
                Nucleotide::from_symbol(upper).ok_or(SequenceError::InvalidSymbol {
                    symbol: c,
                    position: idx + 1,
                })?;
            nucleotides.push(nucleotide);
            symbols.push(if convert_dna && nucleotide != Nucleotide::N {
                nucleotide.symbol()
            } else {
                upper
            });
        }

        if nucleotides.is_empty() {
            return Err(SequenceError::Empty);
        }

        Ok(Self {
            nucleotides,
            symbols,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nucleotides.len()
    }

    /// Always `false`; an empty sequence cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nucleotides.is_empty()
    }

    pub fn nucleotides(&self) -> &[Nucleotide] {
        &self.nucleotides
    }

    /// Nucleotide at a 1-based position.
    #[inline]
    pub fn at(&self, position: usize) -> Nucleotide {
        self.nucleotides[position - 1]
    }

    /// Display symbol at a 1-based position.
    #[inline]
    pub fn symbol_at(&self, position: usize) -> char {
        self.symbols[position - 1]
    }

    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
