use super::matrix::Matrix;
use super::model::{Constraints, EnergyModel};
use super::params::{MAX_LOOP, MIN_HAIRPIN};

/// The semiring a recursion is evaluated in.
///
/// `weight` turns a loop energy covering `nucleotides` newly enclosed positions into a
/// semiring value.
pub(crate) trait Algebra {
    fn zero(&self) -> f64;
    fn one(&self) -> f64;
    fn plus(&self, a: f64, b: f64) -> f64;
    fn times(&self, a: f64, b: f64) -> f64;
    fn weight(&self, energy: f64, nucleotides: usize) -> f64;
}

/// Energies combined by minimization; yields minimum free energies.
pub(crate) struct MinPlus;

impl Algebra for MinPlus {
    #[inline]
    fn zero(&self) -> f64 {
        f64::INFINITY
    }
    #[inline]
    fn one(&self) -> f64 {
        0.0
    }
    #[inline]
    fn plus(&self, a: f64, b: f64) -> f64 {
        a.min(b)
    }
    #[inline]
    fn times(&self, a: f64, b: f64) -> f64 {
        a + b
    }
    #[inline]
    fn weight(&self, energy: f64, _nucleotides: usize) -> f64 {
        energy
    }
}

/// Scaled Boltzmann factors combined by summation; yields partition functions.
pub(crate) struct Boltzmann {
    kt: f64,
    scale: Vec<f64>,
}

impl Boltzmann {
    /// `pf_scale` is the per-nucleotide factor divided out of every weight.
    pub fn new(kt: f64, pf_scale: f64, length: usize) -> Self {
        let mut scale = Vec::with_capacity(length + 1);
        let mut factor = 1.0;
        for _ in 0..=length {
            scale.push(factor);
            factor /= pf_scale;
        }
        Self { kt, scale }
    }
}

impl Algebra for Boltzmann {
    #[inline]
    fn zero(&self) -> f64 {
        0.0
    }
    #[inline]
    fn one(&self) -> f64 {
        1.0
    }
    #[inline]
    fn plus(&self, a: f64, b: f64) -> f64 {
        a + b
    }
    #[inline]
    fn times(&self, a: f64, b: f64) -> f64 {
        a * b
    }
    #[inline]
    fn weight(&self, energy: f64, nucleotides: usize) -> f64 {
        if energy.is_finite() {
            (-energy / self.kt).exp() * self.scale[nucleotides]
        } else {
            0.0
        }
    }
}

/// Loop weights of one constrained model in one algebra.
pub(crate) struct Rules<'a, A: Algebra> {
    pub model: &'a EnergyModel,
    pub constraints: &'a Constraints,
    pub algebra: &'a A,
}

impl<'a, A: Algebra> Rules<'a, A> {
    pub fn new(model: &'a EnergyModel, constraints: &'a Constraints, algebra: &'a A) -> Self {
        Self {
            model,
            constraints,
            algebra,
        }
    }

    #[inline]
    pub fn can_pair(&self, i: usize, j: usize) -> bool {
        self.model.pair(i, j).is_some() && self.constraints.allows_pair(i, j)
    }

    pub fn hairpin(&self, i: usize, j: usize) -> f64 {
        match self.model.pair(i, j) {
            Some(pair) => self.algebra.weight(
                self.model.hairpin(i, j, pair) + self.constraints.unpaired(i + 1, j - 1),
                j - i + 1,
            ),
            None => self.algebra.zero(),
        }
    }

    pub fn interior(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        match (self.model.pair(i, j), self.model.pair(k, l)) {
            (Some(outer), Some(inner)) => self.algebra.weight(
                self.model.interior(i, j, k, l, outer, inner)
                    + self.constraints.unpaired(i + 1, k - 1)
                    + self.constraints.unpaired(l + 1, j - 1),
                (k - i) + (j - l),
            ),
            _ => self.algebra.zero(),
        }
    }

    pub fn multi_closing(&self, i: usize, j: usize) -> f64 {
        match self.model.pair(i, j) {
            Some(pair) => self.algebra.weight(self.model.multi_closing(i, j, pair), 2),
            None => self.algebra.zero(),
        }
    }

    pub fn multi_branch(&self, i: usize, j: usize) -> f64 {
        match self.model.pair(i, j) {
            Some(pair) => self.algebra.weight(self.model.multi_branch(i, j, pair), 0),
            None => self.algebra.zero(),
        }
    }

    /// Unpaired stretch `a..=b` inside a multiloop.
    pub fn multi_unpaired(&self, a: usize, b: usize) -> f64 {
        if a > b {
            return self.algebra.one();
        }
        let count = b - a + 1;
        self.algebra.weight(
            self.model.multi_unpaired(count) + self.constraints.unpaired(a, b),
            count,
        )
    }

    pub fn exterior_branch(&self, i: usize, j: usize) -> f64 {
        match self.model.pair(i, j) {
            Some(pair) => self
                .algebra
                .weight(self.model.exterior_branch(i, j, pair), 0),
            None => self.algebra.zero(),
        }
    }

    pub fn exterior_unpaired(&self, j: usize) -> f64 {
        self.algebra.weight(self.constraints.unpaired(j, j), 1)
    }

    /// Inner pairs `(k, l)` that can close an interior loop under `(i, j)`.
    pub fn interior_candidates(&self, i: usize, j: usize) -> impl Iterator<Item = (usize, usize)> {
        let k_max = (i + MAX_LOOP + 1).min(j - MIN_HAIRPIN - 2);
        (i + 1..=k_max).flat_map(move |k| {
            let left = k - i - 1;
            let l_min = (k + MIN_HAIRPIN + 1).max((j - 1).saturating_sub(MAX_LOOP - left));
            (l_min..j).map(move |l| (k, l))
        })
    }
}

/// Inside tables of one recursion.
///
/// - `qb[i][j]`: `(i, j)` paired, everything between them folded.
/// - `qm1[i][j]`: exactly one multiloop branch, starting with a pair on `i`.
/// - `qm[i][j]`: at least one multiloop branch.
/// - `z5[j]`: prefix `1..=j` in the exterior loop.
pub(crate) struct InsideTables {
    pub qb: Matrix,
    pub qm: Matrix,
    pub qm1: Matrix,
    pub z5: Vec<f64>,
}

pub(crate) fn fill<A: Algebra>(rules: &Rules<'_, A>) -> InsideTables {
    let n = rules.model.length();
    let alg = rules.algebra;
    let mut qb = Matrix::filled(n, alg.zero());
    let mut qm = Matrix::filled(n, alg.zero());
    let mut qm1 = Matrix::filled(n, alg.zero());

    for span in (MIN_HAIRPIN + 1)..n {
        for i in 1..=(n - span) {
            let j = i + span;

            if rules.can_pair(i, j) {
                let mut total = rules.hairpin(i, j);
                for (k, l) in rules.interior_candidates(i, j) {
                    if rules.can_pair(k, l) {
                        total = alg.plus(total, alg.times(rules.interior(i, j, k, l), qb[(k, l)]));
                    }
                }
                let mut branches = alg.zero();
                for u in (i + 2)..j {
                    branches = alg.plus(branches, alg.times(qm[(i + 1, u - 1)], qm1[(u, j - 1)]));
                }
                total = alg.plus(total, alg.times(rules.multi_closing(i, j), branches));
                qb[(i, j)] = total;
            }

            let mut single = alg.zero();
            for l in (i + MIN_HAIRPIN + 1)..=j {
                if rules.can_pair(i, l) {
                    let branch = alg.times(qb[(i, l)], rules.multi_branch(i, l));
                    single = alg.plus(single, alg.times(branch, rules.multi_unpaired(l + 1, j)));
                }
            }
            qm1[(i, j)] = single;

            let mut multi = alg.zero();
            for u in i..=(j - MIN_HAIRPIN - 1) {
                let prefix = alg.plus(rules.multi_unpaired(i, u - 1), qm[(i, u - 1)]);
                multi = alg.plus(multi, alg.times(prefix, qm1[(u, j)]));
            }
            qm[(i, j)] = multi;
        }
    }

    let mut z5 = vec![alg.zero(); n + 1];
    z5[0] = alg.one();
    for j in 1..=n {
        let mut total = alg.times(z5[j - 1], rules.exterior_unpaired(j));
        for k in 1..=j.saturating_sub(MIN_HAIRPIN + 1) {
            if rules.can_pair(k, j) {
                let helix = alg.times(qb[(k, j)], rules.exterior_branch(k, j));
                total = alg.plus(total, alg.times(z5[k - 1], helix));
            }
        }
        z5[j] = total;
    }

    InsideTables { qb, qm, qm1, z5 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fold::params::EnergyParameters;
    use crate::core::models::details::ModelDetails;
    use crate::core::models::sequence::Sequence;

    fn model(raw: &str) -> EnergyModel {
        let sequence = Sequence::new(raw).unwrap();
        EnergyModel::new(&sequence, &EnergyParameters::default(), &ModelDetails::default())
            .unwrap()
    }

    #[test]
    fn short_sequence_has_only_the_open_chain() {
        let m = model("GAAC");
        let constraints = Constraints::none(4);
        let tables = fill(&Rules::new(&m, &constraints, &MinPlus));
        assert_eq!(tables.z5[4], 0.0);
        let tables = fill(&Rules::new(&m, &constraints, &Boltzmann::new(m.kt(), 1.0, 4)));
        assert!((tables.z5[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_hairpin_partition_function_adds_its_weight() {
        let m = model("GAAAC");
        let constraints = Constraints::none(5);
        let alg = Boltzmann::new(m.kt(), 1.0, 5);
        let rules = Rules::new(&m, &constraints, &alg);
        let tables = fill(&rules);
        let hairpin = rules.hairpin(1, 5) * rules.exterior_branch(1, 5);
        assert!((tables.z5[5] - (1.0 + hairpin)).abs() < 1e-12);
    }

    #[test]
    fn mfe_of_stable_stem_is_negative() {
        let m = model("GGGGAAACCCC");
        let constraints = Constraints::none(11);
        let tables = fill(&Rules::new(&m, &constraints, &MinPlus));
        assert!(tables.z5[11] < 0.0);
    }

    #[test]
    fn scale_factor_divides_out_per_nucleotide() {
        let m = model("GGGAAACCC");
        let constraints = Constraints::none(9);
        let plain = fill(&Rules::new(&m, &constraints, &Boltzmann::new(m.kt(), 1.0, 9)));
        let scaled = fill(&Rules::new(&m, &constraints, &Boltzmann::new(m.kt(), 2.0, 9)));
        let restored = scaled.z5[9] * 2f64.powi(9);
        assert!((restored - plain.z5[9]).abs() < 1e-9 * plain.z5[9]);
    }

    #[test]
    fn forced_unpaired_position_blocks_its_pairs() {
        let m = model("GAAAC");
        let constraints = Constraints::new(&[0.0; 5], Some(1));
        let tables = fill(&Rules::new(&m, &constraints, &Boltzmann::new(m.kt(), 1.0, 5)));
        assert!((tables.z5[5] - 1.0).abs() < 1e-12);
    }
}
