use crate::core::fold::{FoldingEngine, FoldingError};
use crate::core::models::perturbation::PerturbationVector;
use rand::RngCore;
use tracing::trace;

/// Unpaired probabilities of every position, and of every position given that another
/// position is unpaired.
#[derive(Debug, Clone, PartialEq)]
pub struct PairingStatistics {
    unpaired: Vec<f64>,
    conditional: Vec<Vec<f64>>,
}

impl PairingStatistics {
    /// `conditional[i][mu]` is the probability that `mu` is unpaired given that `i` is.
    pub fn from_parts(unpaired: Vec<f64>, conditional: Vec<Vec<f64>>) -> Self {
        Self {
            unpaired,
            conditional,
        }
    }

    /// Exact statistics from one unrestricted and one restricted ensemble per position.
    pub fn exact<E>(engine: &E, bias: &PerturbationVector) -> Result<Self, FoldingError>
    where
        E: FoldingEngine + ?Sized,
    {
        let unpaired = engine.unpaired_probabilities(bias, None)?;
        let mut conditional = Vec::with_capacity(unpaired.len());
        for (idx, &p) in unpaired.iter().enumerate() {
            if p > 0.0 {
                conditional.push(engine.unpaired_probabilities(bias, Some(idx + 1))?);
            } else {
                conditional.push(unpaired.clone());
            }
        }
        Ok(Self {
            unpaired,
            conditional,
        })
    }

    /// Estimates from `count` sampled structures.
    pub fn sampled<E>(
        engine: &E,
        bias: &PerturbationVector,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Self, FoldingError>
    where
        E: FoldingEngine + ?Sized,
    {
        let length = engine.sequence().len();
        let structures = engine.sample_structures(bias, count, rng)?;
        trace!(samples = structures.len(), "Counting unpaired positions");

        let mut singles = vec![0usize; length];
        let mut joint = vec![vec![0usize; length]; length];
        for structure in &structures {
            let open: Vec<usize> = structure
                .bytes()
                .enumerate()
                .filter(|&(_, c)| c == b'.')
                .map(|(idx, _)| idx)
                .collect();
            for &i in &open {
                singles[i] += 1;
                for &mu in &open {
                    joint[i][mu] += 1;
                }
            }
        }

        let total = structures.len().max(1) as f64;
        let unpaired: Vec<f64> = singles.iter().map(|&c| c as f64 / total).collect();
        let conditional = (0..length)
            .map(|i| {
                if singles[i] == 0 {
                    unpaired.clone()
                } else {
                    let n_i = singles[i] as f64;
                    joint[i].iter().map(|&c| c as f64 / n_i).collect()
                }
            })
            .collect();

        Ok(Self {
            unpaired,
            conditional,
        })
    }

    pub fn len(&self) -> usize {
        self.unpaired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unpaired.is_empty()
    }

    pub fn unpaired(&self) -> &[f64] {
        &self.unpaired
    }

    /// Probability that `mu` is unpaired given that `i` is; both 0-based.
    #[inline]
    pub fn conditional(&self, i: usize, mu: usize) -> f64 {
        self.conditional[i][mu]
    }
}
