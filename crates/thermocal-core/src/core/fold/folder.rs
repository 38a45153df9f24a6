use super::inside::{Boltzmann, MinPlus, Rules, fill};
use super::model::{Constraints, EnergyModel};
use super::outside::{pair_probabilities, unpaired_from_pairs};
use super::params::EnergyParameters;
use super::sampling::sample_structure;
use super::{FoldingEngine, FoldingError};
use crate::core::models::details::ModelDetails;
use crate::core::models::perturbation::PerturbationVector;
use crate::core::models::sequence::Sequence;
use rand::RngCore;
use tracing::trace;

/// Reference [`FoldingEngine`] for a single RNA strand.
///
/// Partition sums are divided by `pf_scale` once per nucleotide. Until [`rescale`] is called
/// the scale is 1, which is only adequate for short sequences.
///
/// [`rescale`]: FoldingEngine::rescale
#[derive(Debug, Clone)]
pub struct RnaFolder {
    sequence: Sequence,
    parameters: EnergyParameters,
    model: EnergyModel,
    rescaling_factor: f64,
    pf_scale: f64,
}

impl RnaFolder {
    pub fn new(sequence: Sequence, details: &ModelDetails) -> Result<Self, FoldingError> {
        Self::with_parameters(sequence, EnergyParameters::default(), details)
    }

    pub fn with_parameters(
        sequence: Sequence,
        parameters: EnergyParameters,
        details: &ModelDetails,
    ) -> Result<Self, FoldingError> {
        let model = EnergyModel::new(&sequence, &parameters, details)?;
        Ok(Self {
            sequence,
            parameters,
            model,
            rescaling_factor: details.rescaling_factor,
            pf_scale: 1.0,
        })
    }

    /// Current per-nucleotide partition-function scale.
    pub fn pf_scale(&self) -> f64 {
        self.pf_scale
    }

    fn constraints(
        &self,
        bias: &PerturbationVector,
        forced_unpaired: Option<usize>,
    ) -> Result<Constraints, FoldingError> {
        let length = self.sequence.len();
        if bias.len() != length {
            return Err(FoldingError::LengthMismatch {
                expected: length,
                found: bias.len(),
            });
        }
        if let Some(position) = forced_unpaired {
            if position == 0 || position > length {
                return Err(FoldingError::InvalidPosition { position, length });
            }
        }
        Ok(Constraints::new(bias.as_slice(), forced_unpaired))
    }

    fn algebra(&self) -> Boltzmann {
        Boltzmann::new(self.model.kt(), self.pf_scale, self.sequence.len())
    }
}

impl FoldingEngine for RnaFolder {
    fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    fn apply_model_details(&mut self, details: &ModelDetails) -> Result<(), FoldingError> {
        self.model = EnergyModel::new(&self.sequence, &self.parameters, details)?;
        self.rescaling_factor = details.rescaling_factor;
        Ok(())
    }

    fn rescale(&mut self, reference_energy: f64) {
        let kt = self.model.kt();
        let length = self.sequence.len() as f64;
        self.pf_scale = (-(self.rescaling_factor * reference_energy) / (kt * length)).exp();
        trace!(reference_energy, pf_scale = self.pf_scale, "Rescaled partition function");
    }

    fn minimum_free_energy(&self) -> Result<f64, FoldingError> {
        let constraints = Constraints::none(self.sequence.len());
        let tables = fill(&Rules::new(&self.model, &constraints, &MinPlus));
        Ok(tables.z5[self.sequence.len()])
    }

    fn ensemble_free_energy(&self) -> Result<f64, FoldingError> {
        let n = self.sequence.len();
        let constraints = Constraints::none(n);
        let algebra = self.algebra();
        let tables = fill(&Rules::new(&self.model, &constraints, &algebra));
        let z = tables.z5[n];
        if !(z.is_finite() && z > 0.0) {
            return Err(FoldingError::NumericOverflow);
        }
        Ok(-self.model.kt() * (z.ln() + n as f64 * self.pf_scale.ln()))
    }

    fn unpaired_probabilities(
        &self,
        bias: &PerturbationVector,
        forced_unpaired: Option<usize>,
    ) -> Result<Vec<f64>, FoldingError> {
        let constraints = self.constraints(bias, forced_unpaired)?;
        let algebra = self.algebra();
        let rules = Rules::new(&self.model, &constraints, &algebra);
        let tables = fill(&rules);
        let pairs = pair_probabilities(&rules, &tables)?;
        Ok(unpaired_from_pairs(&pairs, self.sequence.len()))
    }

    fn sample_structures(
        &self,
        bias: &PerturbationVector,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, FoldingError> {
        let constraints = self.constraints(bias, None)?;
        let algebra = self.algebra();
        let rules = Rules::new(&self.model, &constraints, &algebra);
        let tables = fill(&rules);
        let z = tables.z5[self.sequence.len()];
        if !(z.is_finite() && z > 0.0) {
            return Err(FoldingError::NumericOverflow);
        }
        (0..count)
            .map(|_| sample_structure(&rules, &tables, rng))
            .collect()
    }
}
