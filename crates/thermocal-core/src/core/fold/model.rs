use super::FoldingError;
use super::pairs::PairType;
use super::params::{EnergyParameters, MIN_HAIRPIN, ScaledParameters};
use crate::core::models::details::{DangleModel, ModelDetails};
use crate::core::models::sequence::{Nucleotide, Sequence};

/// Loop energies of one sequence at one temperature, in kcal/mol.
///
/// Positions are 1-based throughout. Every function assumes its arguments describe a valid
/// loop; infinite energies mark forbidden loops.
#[derive(Debug, Clone)]
pub(crate) struct EnergyModel {
    length: usize,
    sequence: Vec<Nucleotide>,
    params: ScaledParameters,
    dangles: DangleModel,
    no_gu_closure: bool,
    special_hairpins: bool,
    pairs: Vec<Option<PairType>>,
}

impl EnergyModel {
    pub fn new(
        sequence: &Sequence,
        parameters: &EnergyParameters,
        details: &ModelDetails,
    ) -> Result<Self, FoldingError> {
        if details.energy_set != 0 {
            return Err(FoldingError::UnsupportedEnergySet(details.energy_set));
        }

        let length = sequence.len();
        let mut model = Self {
            length,
            sequence: sequence.nucleotides().to_vec(),
            params: parameters.scaled(details.kelvin(), details.thermal_energy()),
            dangles: details.dangles,
            no_gu_closure: details.no_gu_closure,
            special_hairpins: details.special_hairpins,
            pairs: Vec::new(),
        };
        model.pairs = model.build_pair_table(details.no_gu, details.no_lonely_pairs);
        Ok(model)
    }

    fn build_pair_table(&self, no_gu: bool, no_lonely_pairs: bool) -> Vec<Option<PairType>> {
        let n = self.length;
        let dim = n + 2;
        let mut raw = vec![None; dim * dim];
        for i in 1..=n {
            for j in (i + MIN_HAIRPIN + 1)..=n {
                raw[i * dim + j] = PairType::of(self.nt(i), self.nt(j))
                    .filter(|pair| !(no_gu && pair.is_wobble()));
            }
        }
        if !no_lonely_pairs {
            return raw;
        }

        let mut pruned = raw.clone();
        for i in 1..=n {
            for j in (i + MIN_HAIRPIN + 1)..=n {
                if raw[i * dim + j].is_none() {
                    continue;
                }
                let outer = i > 1 && j < n && raw[(i - 1) * dim + j + 1].is_some();
                let inner = j - i - 2 > MIN_HAIRPIN && raw[(i + 1) * dim + j - 1].is_some();
                if !outer && !inner {
                    pruned[i * dim + j] = None;
                }
            }
        }
        pruned
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn kt(&self) -> f64 {
        self.params.kt
    }

    #[inline]
    fn nt(&self, position: usize) -> Nucleotide {
        self.sequence[position - 1]
    }

    /// Pair type of `(i, j)` if the two positions may pair under the current model flags.
    #[inline]
    pub fn pair(&self, i: usize, j: usize) -> Option<PairType> {
        self.pairs[i * (self.length + 2) + j]
    }

    #[inline]
    fn terminal(&self, pair: PairType) -> f64 {
        if pair.is_weak() {
            self.params.terminal_au
        } else {
            0.0
        }
    }

    pub fn hairpin(&self, i: usize, j: usize, pair: PairType) -> f64 {
        let size = j - i - 1;
        if size < MIN_HAIRPIN || (self.no_gu_closure && pair.is_wobble()) {
            return f64::INFINITY;
        }
        if self.special_hairpins && size == 4 {
            let hairpin: String = (i..=j).map(|p| self.nt(p).symbol()).collect();
            if let Some(energy) = self.params.tetraloop(&hairpin) {
                return energy;
            }
        }
        self.params.loop_energy(&self.params.hairpin, size) + self.terminal(pair)
    }

    /// Stack, bulge or interior loop closed by `(i, j)` with inner pair `(k, l)`.
    pub fn interior(
        &self,
        i: usize,
        j: usize,
        k: usize,
        l: usize,
        outer: PairType,
        inner: PairType,
    ) -> f64 {
        let p = &self.params;
        let stack = p.stack[outer.index()][inner.reversed().index()];
        match (k - i - 1, j - l - 1) {
            (0, 0) => stack,
            (0, size) | (size, 0) => {
                let bulge = p.loop_energy(&p.bulge, size);
                if size == 1 {
                    bulge + stack
                } else {
                    bulge + self.terminal(outer) + self.terminal(inner)
                }
            }
            (left, right) => {
                let asymmetry = (p.ninio * left.abs_diff(right) as f64).min(p.max_ninio);
                p.loop_energy(&p.interior, left + right)
                    + asymmetry
                    + self.terminal(outer)
                    + self.terminal(inner)
            }
        }
    }

    /// Helix `(i, j)` branching off the exterior loop.
    pub fn exterior_branch(&self, i: usize, j: usize, pair: PairType) -> f64 {
        self.terminal(pair) + self.outer_dangles(i, j, pair)
    }

    /// Helix `(i, j)` branching off a multiloop.
    pub fn multi_branch(&self, i: usize, j: usize, pair: PairType) -> f64 {
        self.params.ml_intern + self.terminal(pair) + self.outer_dangles(i, j, pair)
    }

    /// Pair `(i, j)` closing a multiloop, seen from inside the loop.
    pub fn multi_closing(&self, i: usize, j: usize, pair: PairType) -> f64 {
        if self.no_gu_closure && pair.is_wobble() {
            return f64::INFINITY;
        }
        let mut energy = self.params.ml_closing + self.params.ml_intern + self.terminal(pair);
        if self.dangles == DangleModel::Double {
            let inside = pair.reversed();
            energy += self.dangle5(inside, j - 1) + self.dangle3(inside, i + 1);
        }
        energy
    }

    /// Dangles on the neighbours of a helix end, skipped past the sequence ends.
    fn outer_dangles(&self, i: usize, j: usize, pair: PairType) -> f64 {
        if self.dangles != DangleModel::Double {
            return 0.0;
        }
        let mut energy = 0.0;
        if i > 1 {
            energy += self.dangle5(pair, i - 1);
        }
        if j < self.length {
            energy += self.dangle3(pair, j + 1);
        }
        energy
    }

    /// `N` neighbours contribute no dangle energy.
    fn dangle5(&self, pair: PairType, position: usize) -> f64 {
        self.nt(position)
            .index()
            .map_or(0.0, |base| self.params.dangle5[pair.index()][base])
    }

    fn dangle3(&self, pair: PairType, position: usize) -> f64 {
        self.nt(position)
            .index()
            .map_or(0.0, |base| self.params.dangle3[pair.index()][base])
    }

    #[inline]
    pub fn multi_unpaired(&self, count: usize) -> f64 {
        self.params.ml_base * count as f64
    }
}

/// Per-call soft and hard constraints: pseudo-energies for unpaired positions and an
/// optional position that must stay unpaired.
#[derive(Debug, Clone)]
pub(crate) struct Constraints {
    prefix: Vec<f64>,
    forced_unpaired: Option<usize>,
}

impl Constraints {
    pub fn none(length: usize) -> Self {
        Self {
            prefix: vec![0.0; length + 1],
            forced_unpaired: None,
        }
    }

    pub fn new(bias: &[f64], forced_unpaired: Option<usize>) -> Self {
        let mut prefix = Vec::with_capacity(bias.len() + 1);
        prefix.push(0.0);
        let mut running = 0.0;
        for value in bias {
            running += value;
            prefix.push(running);
        }
        Self {
            prefix,
            forced_unpaired,
        }
    }

    /// Summed pseudo-energy of positions `a..=b`; zero for an empty range.
    #[inline]
    pub fn unpaired(&self, a: usize, b: usize) -> f64 {
        if a > b {
            0.0
        } else {
            self.prefix[b] - self.prefix[a - 1]
        }
    }

    #[inline]
    pub fn allows_pair(&self, i: usize, j: usize) -> bool {
        self.forced_unpaired != Some(i) && self.forced_unpaired != Some(j)
    }
}
